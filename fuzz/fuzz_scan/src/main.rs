#[cfg(all(feature = "afl_fuzz", checked))]
fn main() {
    afl::fuzz!(|input: &[u8]| {
        fuzz_scan::scan(input);
    });
}

#[cfg(not(all(feature = "afl_fuzz", checked)))]
fn main() {
    panic!("fuzz_scan must be built with --features afl_fuzz under a `checked` cfg build");
}
