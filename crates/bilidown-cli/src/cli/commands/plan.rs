//! `bilidown plan` – print the fragment plan for a size.

use anyhow::{bail, Context, Result};
use bilidown_core::config::BilidownConfig;
use bilidown_core::segmenter::{fragment_count, plan_fragments, Fragment};
use std::num::NonZeroU64;

/// Largest plan printed in full.
const MAX_LISTED_FRAGMENTS: u64 = 1_000_000;

pub fn run_plan(size: u64, fragment_size: Option<u64>, cfg: &BilidownConfig) -> Result<()> {
    let fragment_size = match fragment_size {
        Some(n) => NonZeroU64::new(n).context("--fragment-size must be greater than 0")?,
        None => cfg.fragment_size()?,
    };
    let count = fragment_count(size, fragment_size);
    if count > MAX_LISTED_FRAGMENTS {
        bail!(
            "{} fragments is too many to list (limit {}); use a larger --fragment-size",
            count,
            MAX_LISTED_FRAGMENTS
        );
    }
    let fragments = plan_fragments(size, fragment_size);
    print!("{}", format_plan(&fragments));
    println!(
        "{} fragment(s), {} bytes, fragment size {}",
        fragments.len(),
        size,
        fragment_size
    );
    Ok(())
}

pub(crate) fn format_plan(fragments: &[Fragment]) -> String {
    let mut out = String::new();
    for f in fragments {
        out.push_str(&format!(
            "{:>6}  {}  {} bytes\n",
            f.index,
            f.range_header_value(),
            f.len()
        ));
    }
    out
}
