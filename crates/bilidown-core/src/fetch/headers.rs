//! Fixed browser-like header sets for the preflight probe and range fetches.
//!
//! The remote only accepts requests that look like they came from the site's
//! web player, so these values are sent verbatim. Only the referer (derived
//! from the resource identifier) and the range are computed per request.

use crate::segmenter::Fragment;

pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/95.0.4638.69 Safari/537.36";

pub const ORIGIN: &str = "https://www.bilibili.com";

const PREFLIGHT_STATIC: [(&str, &str); 9] = [
    ("accept", "*/*"),
    ("accept-encoding", "gzip, deflate, br"),
    ("access-control-request-headers", "range"),
    ("access-control-request-method", "GET"),
    ("origin", ORIGIN),
    ("sec-fetch-dest", "empty"),
    ("sec-fetch-mode", "cors"),
    ("sec-fetch-site", "cross-site"),
    ("user-agent", USER_AGENT),
];

const RANGE_STATIC: [(&str, &str); 12] = [
    ("accept", "*/*"),
    ("accept-encoding", "identity"),
    ("accept-language", "zh-CN,zh;q=0.9,en-US;q=0.8,en;q=0.7"),
    ("dnt", "1"),
    ("origin", ORIGIN),
    (
        "sec-ch-ua",
        r#""Google Chrome";v="95", "Chromium";v="95", ";Not A Brand";v="99""#,
    ),
    ("sec-ch-ua-mobile", "?0"),
    ("sec-ch-ua-platform", "Windows"),
    ("sec-fetch-dest", "empty"),
    ("sec-fetch-mode", "cors"),
    ("sec-fetch-site", "cross-site"),
    ("user-agent", USER_AGENT),
];

/// Complete header set for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHeaders {
    fixed: &'static [(&'static str, &'static str)],
    referer: String,
    range: Option<String>,
}

impl RequestHeaders {
    /// Headers for the OPTIONS capability probe.
    pub fn preflight(video_id: &str) -> Self {
        Self {
            fixed: &PREFLIGHT_STATIC,
            referer: format!("{}/{}", ORIGIN, video_id),
            range: None,
        }
    }

    /// Headers for the ranged GET of `fragment`.
    pub fn range(video_id: &str, fragment: &Fragment) -> Self {
        Self {
            fixed: &RANGE_STATIC,
            referer: format!("{}/video/{}", ORIGIN, video_id),
            range: Some(fragment.range_header_value()),
        }
    }

    /// Header lines in `name: value` form, in send order.
    pub fn lines(&self) -> Vec<String> {
        let mut out: Vec<String> = self
            .fixed
            .iter()
            .map(|(k, v)| format!("{}: {}", k, v))
            .collect();
        out.push(format!("referer: {}", self.referer));
        if let Some(range) = &self.range {
            out.push(format!("range: {}", range));
        }
        out
    }

    pub(crate) fn to_curl_list(&self) -> Result<curl::easy::List, curl::Error> {
        let mut list = curl::easy::List::new();
        for line in self.lines() {
            list.append(&line)?;
        }
        Ok(list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value<'a>(lines: &'a [String], name: &str) -> Option<&'a str> {
        lines.iter().find_map(|l| {
            let (k, v) = l.split_once(": ")?;
            (k == name).then_some(v)
        })
    }

    #[test]
    fn preflight_headers() {
        let h = RequestHeaders::preflight("BV1xx411c7mD");
        let lines = h.lines();
        assert_eq!(value(&lines, "origin"), Some("https://www.bilibili.com"));
        assert_eq!(
            value(&lines, "referer"),
            Some("https://www.bilibili.com/BV1xx411c7mD")
        );
        assert_eq!(value(&lines, "access-control-request-method"), Some("GET"));
        assert_eq!(value(&lines, "access-control-request-headers"), Some("range"));
        assert_eq!(value(&lines, "user-agent"), Some(USER_AGENT));
        assert!(value(&lines, "range").is_none());
    }

    #[test]
    fn range_headers_carry_inclusive_bounds() {
        let frag = Fragment {
            index: 1,
            begin: 400,
            end: 799,
        };
        let h = RequestHeaders::range("BV1xx411c7mD", &frag);
        let lines = h.lines();
        assert_eq!(value(&lines, "range"), Some("bytes=400-799"));
        assert_eq!(
            value(&lines, "referer"),
            Some("https://www.bilibili.com/video/BV1xx411c7mD")
        );
        assert_eq!(value(&lines, "accept-encoding"), Some("identity"));
        assert_eq!(value(&lines, "sec-ch-ua-platform"), Some("Windows"));
        assert_eq!(
            value(&lines, "sec-ch-ua"),
            Some(r#""Google Chrome";v="95", "Chromium";v="95", ";Not A Brand";v="99""#)
        );
    }

    #[test]
    fn header_names_are_unique() {
        let frag = Fragment {
            index: 0,
            begin: 0,
            end: 0,
        };
        for h in [RequestHeaders::preflight("x"), RequestHeaders::range("x", &frag)] {
            let lines = h.lines();
            let mut names: Vec<_> = lines.iter().filter_map(|l| l.split_once(':')).map(|(k, _)| k).collect();
            let n = names.len();
            names.sort();
            names.dedup();
            assert_eq!(names.len(), n);
        }
    }
}
