//! Ranged GET with strict response validation.

use std::cell::{Cell, RefCell};

use super::parse::{HeaderBlock, ResponseHead};
use super::{transport, FetchOptions, RequestHeaders};
use crate::error::{DownloadError, ProtocolError};
use crate::segmenter::Fragment;

/// Downloads `fragment` into `buf`. The response head is validated as soon as
/// the first body bytes arrive and the transfer is aborted on mismatch.
pub(super) fn fetch_range(
    url: &str,
    video_id: &str,
    fragment: &Fragment,
    buf: Vec<u8>,
    opts: &FetchOptions,
) -> Result<Vec<u8>, DownloadError> {
    let index = fragment.index;
    let expected = fragment.len();
    let headers = RequestHeaders::range(video_id, fragment);

    let block = RefCell::new(HeaderBlock::default());
    let body = RefCell::new(buf);
    let validated = Cell::new(false);
    let rejected: RefCell<Option<ProtocolError>> = RefCell::new(None);

    let mut easy = curl::easy::Easy::new();
    easy.url(url).map_err(transport(index))?;
    easy.get(true).map_err(transport(index))?;
    easy.follow_location(true).map_err(transport(index))?;
    easy.connect_timeout(opts.connect_timeout)
        .map_err(transport(index))?;
    easy.timeout(opts.request_timeout).map_err(transport(index))?;
    easy.http_headers(headers.to_curl_list().map_err(transport(index))?)
        .map_err(transport(index))?;

    let performed = {
        let mut transfer = easy.transfer();
        transfer
            .header_function(|data| {
                block.borrow_mut().push(data);
                true
            })
            .map_err(transport(index))?;
        transfer
            .write_function(|data| {
                if !validated.get() {
                    if let Err(kind) = validate(&block.borrow().head(), expected) {
                        *rejected.borrow_mut() = Some(kind);
                        return Ok(0);
                    }
                    validated.set(true);
                }
                let mut body = body.borrow_mut();
                let received = (body.len() + data.len()) as u64;
                if received > expected {
                    *rejected.borrow_mut() = Some(ProtocolError::BodyLengthMismatch { expected, received });
                    return Ok(0);
                }
                body.extend_from_slice(data);
                Ok(data.len())
            })
            .map_err(transport(index))?;
        transfer.perform()
    };

    // A rejection aborts the transfer, which curl reports as a write error.
    if let Some(kind) = rejected.into_inner() {
        return Err(DownloadError::protocol(index, kind));
    }
    if let Err(e) = performed {
        // Connection closed before the declared length arrived.
        if e.is_partial_file() {
            return Err(DownloadError::protocol(
                index,
                ProtocolError::BodyLengthMismatch {
                    expected,
                    received: body.borrow().len() as u64,
                },
            ));
        }
        return Err(transport(index)(e));
    }

    // Covers responses that ended without any body bytes.
    validate(&block.into_inner().head(), expected)
        .map_err(|kind| DownloadError::protocol(index, kind))?;

    let body = body.into_inner();
    let received = body.len() as u64;
    if received != expected {
        return Err(DownloadError::protocol(
            index,
            ProtocolError::BodyLengthMismatch { expected, received },
        ));
    }

    tracing::debug!(fragment = index, bytes = received, "fragment fetched");
    Ok(body)
}

/// Status must be 200/206 and the declared length must equal the range length.
fn validate(head: &ResponseHead, expected: u64) -> Result<(), ProtocolError> {
    match head.status {
        Some(200) | Some(206) => {}
        other => return Err(ProtocolError::UnexpectedStatus(other.unwrap_or(0))),
    }
    let declared = head
        .content_length
        .ok_or(ProtocolError::MissingContentLength)?;
    if declared != expected {
        return Err(ProtocolError::LengthMismatch { expected, declared });
    }
    Ok(())
}
