use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("grid must have at least two points per axis, got {0}x{1}x{2}")]
    GridTooSmall(usize, usize, usize),
    #[error(
        "cannot partition a {nx}x{ny}x{nz} grid onto {num_ranks} ranks: \
         no factorization of {num_ranks} divides ({}, {}, {}) per axis",
        .nx - 1,
        .ny - 1,
        .nz - 1
    )]
    Indivisible {
        num_ranks: usize,
        nx: usize,
        ny: usize,
        nz: usize,
    },
}
