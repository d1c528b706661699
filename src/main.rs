fn main() {
    if let Err(err) = avd_transcoder::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
