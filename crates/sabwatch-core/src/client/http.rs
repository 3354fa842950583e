//! Blocking GET over libcurl.

use std::time::Duration;

use super::ClientError;

/// Perform a GET and return the body of a 2xx response.
///
/// Runs in the current thread; the watchdog loop is single-threaded and waits
/// for each call to finish or time out.
pub(crate) fn get(url: &str, timeout: Duration) -> Result<Vec<u8>, ClientError> {
    let mut body: Vec<u8> = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.get(true)?;
    easy.follow_location(true)?;
    easy.connect_timeout(timeout)?;
    easy.timeout(timeout)?;
    easy.useragent(concat!("sabwatch/", env!("CARGO_PKG_VERSION")))?;

    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform()?;
    }

    let code = easy.response_code()?;
    if !(200..300).contains(&code) {
        return Err(ClientError::Http(code));
    }
    Ok(body)
}
