pub fn assert_is_close(a: f64, b: f64) {
    assert!(
        (a - b).abs() <= 1e-10 * (1.0 + a.abs().max(b.abs())),
        "{} is not close to {}",
        a,
        b
    );
}
