//! OPTIONS capability probe sent before every range fetch.

use super::{transport, FetchOptions, RequestHeaders};
use crate::error::DownloadError;

/// Sends the preflight for fragment `fragment`; anything but HTTP 200 is an auth error.
pub(super) fn check(
    url: &str,
    video_id: &str,
    fragment: usize,
    opts: &FetchOptions,
) -> Result<(), DownloadError> {
    let headers = RequestHeaders::preflight(video_id);

    let mut easy = curl::easy::Easy::new();
    easy.url(url).map_err(transport(fragment))?;
    easy.custom_request("OPTIONS").map_err(transport(fragment))?;
    easy.follow_location(true).map_err(transport(fragment))?;
    easy.connect_timeout(opts.connect_timeout)
        .map_err(transport(fragment))?;
    easy.timeout(opts.request_timeout)
        .map_err(transport(fragment))?;
    easy.http_headers(headers.to_curl_list().map_err(transport(fragment))?)
        .map_err(transport(fragment))?;

    {
        let mut transfer = easy.transfer();
        transfer
            .write_function(|data| Ok(data.len()))
            .map_err(transport(fragment))?;
        transfer.perform().map_err(transport(fragment))?;
    }

    let code = easy.response_code().map_err(transport(fragment))?;
    if code != 200 {
        tracing::warn!(fragment, status = code, "preflight rejected");
        return Err(DownloadError::Auth {
            fragment,
            status: code,
        });
    }
    Ok(())
}
