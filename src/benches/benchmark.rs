use criterion::{black_box, criterion_group, criterion_main, Criterion};
use windevice::codec::{decode_string, decode_string_list, encode_string, encode_string_list};
use windevice::property::RegistryType;
use windevice::StringMatcher;

fn hardware_ids() -> Vec<String> {
    (0..16)
        .map(|i| format!("USB\\VID_046D&PID_C{:03X}&REV_{:04}", i, i * 7))
        .collect()
}

fn criterion_benchmark(c: &mut Criterion) {
    let description = encode_string("Intel(R) Ethernet Connection (7) I219-V");
    c.bench_function("decode string", |b| {
        b.iter(|| decode_string(RegistryType::REG_SZ, black_box(&description)).unwrap())
    });

    let ids = encode_string_list(&hardware_ids());
    c.bench_function("decode string list", |b| {
        b.iter(|| decode_string_list(RegistryType::REG_MULTI_SZ, black_box(&ids)).unwrap())
    });

    let candidates = hardware_ids();
    let matcher = StringMatcher::any(vec![
        StringMatcher::equal_fold("usb\\vid_046d&pid_c00f&rev_0105"),
        StringMatcher::contains_fold("PID_C00A"),
    ]);
    c.bench_function("match hardware ids", |b| {
        b.iter(|| {
            black_box(&candidates)
                .iter()
                .filter(|id| matcher.matches(id))
                .count()
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
