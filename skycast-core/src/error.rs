use thiserror::Error;

/// Failures shown to the user. The message is deliberately generic; the
/// underlying provider error is kept as the source for logging.
#[derive(Debug, Error)]
pub enum WidgetError {
    #[error("city not found")]
    CityNotFound(#[source] anyhow::Error),

    #[error("weather request failed")]
    Weather(#[source] anyhow::Error),

    #[error("forecast request failed")]
    Forecast(#[source] anyhow::Error),
}
