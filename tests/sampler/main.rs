#![allow(
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation
)]

mod fixtures;
mod multivariate_tpe;
mod observation;
mod tpe;
