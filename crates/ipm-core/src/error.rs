use thiserror::Error;

pub type IpmResult<T> = Result<T, IpmError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum IpmError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Inverted interval for {what}: [{lo}, {hi}]")]
    InvertedInterval { what: &'static str, lo: f64, hi: f64 },

    #[error("Unknown unit '{unit}' for {quantity}")]
    UnknownUnit { unit: String, quantity: &'static str },
}
