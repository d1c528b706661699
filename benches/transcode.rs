use avd_transcoder::config::Config;
use avd_transcoder::export;
use avd_transcoder::import;
use avd_transcoder::scene::Document;
use avd_transcoder::xml;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

/// Synthetic animated drawable with `groups` animated paths.
fn synthetic_avd(groups: usize) -> String {
    let mut vector = String::new();
    let mut targets = String::new();
    for i in 0..groups {
        vector.push_str(&format!(
            r##"            <group android:name="g{i}_t" android:translateX="{i}">
                <path android:name="p{i}_p" android:fillColor="#ff{:02x}00" android:pathData="M0,{i} L10,{i} C12,{i} 14,{} 16,{} Z"/>
            </group>
"##,
            (i * 7) % 256,
            i + 2,
            i + 4
        ));
        targets.push_str(&format!(
            r##"    <target android:name="g{i}_t">
        <aapt:attr name="android:animation">
            <set>
                <objectAnimator android:propertyName="translateX" android:duration="300" android:valueFrom="0" android:valueTo="10" android:valueType="floatType" android:interpolator="@android:interpolator/linear"/>
                <objectAnimator android:propertyName="translateY" android:duration="200" android:startOffset="100" android:valueFrom="0" android:valueTo="5" android:valueType="floatType" android:interpolator="@android:interpolator/fast_out_slow_in"/>
            </set>
        </aapt:attr>
    </target>
"##
        ));
    }
    format!(
        r##"<animated-vector xmlns:android="http://schemas.android.com/apk/res/android" xmlns:aapt="http://schemas.android.com/aapt">
    <aapt:attr name="android:drawable">
        <vector android:width="16dp" android:height="16dp" android:viewportWidth="16" android:viewportHeight="16">
{vector}        </vector>
    </aapt:attr>
{targets}</animated-vector>
"##
    )
}

fn imported_scene(text: &str) -> Document {
    let mut doc = Document::new();
    import::import_str(&mut doc, &Config::default(), text).expect("import failed");
    doc
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("xml_parse");
    for size in [4usize, 16, 64] {
        let text = synthetic_avd(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &text, |b, text| {
            b.iter(|| xml::parse(black_box(text)).unwrap());
        });
    }
    group.finish();
}

fn bench_import(c: &mut Criterion) {
    let mut group = c.benchmark_group("import");
    let config = Config::default();
    for size in [4usize, 16, 64] {
        let text = synthetic_avd(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &text, |b, text| {
            b.iter(|| {
                let mut doc = Document::new();
                import::import_str(&mut doc, &config, black_box(text)).unwrap();
                doc
            });
        });
    }
    group.finish();
}

fn bench_export_animated(c: &mut Criterion) {
    let mut group = c.benchmark_group("export_animated");
    let config = Config::default();
    for size in [4usize, 16, 64] {
        let doc = imported_scene(&synthetic_avd(size));
        group.bench_with_input(BenchmarkId::from_parameter(size), &doc, |b, doc| {
            b.iter(|| {
                let mut doc = doc.clone();
                export::animated_vector_drawable_string(black_box(&mut doc), &config).unwrap()
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_parse, bench_import, bench_export_animated);
criterion_main!(benches);
