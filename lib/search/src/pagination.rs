//! Page size and offset arithmetic

use docsearch_core::{Error, QueryParams, Result};

/// Page size used when none (or an unusable one) is given
pub const DEFAULT_PAGE_SIZE: usize = 10;
/// Upper bound on the page size
pub const MAX_PAGE_SIZE: usize = 100;
/// Largest offset the search backend accepts
pub const MAX_OFFSET: usize = i32::MAX as usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub offset: usize,
    pub limit: usize,
}

impl Pagination {
    /// Derive offset and limit from `page` and `page_size`
    ///
    /// A page whose offset exceeds [`MAX_OFFSET`] is rejected.
    pub fn from_params(params: &QueryParams) -> Result<Self> {
        let limit = page_size(params);
        let raw = params.get_str("page").unwrap_or_default();
        let page = leading_int(&raw);
        if page < 1 {
            return Ok(Self { offset: 0, limit });
        }

        let offset = usize::try_from(page - 1)
            .ok()
            .and_then(|skipped| limit.checked_mul(skipped))
            .filter(|offset| *offset <= MAX_OFFSET)
            .ok_or_else(|| Error::invalid_value("page", format!("'{}' is out of range", raw)))?;

        Ok(Self { offset, limit })
    }
}

/// Requested page size
///
/// An explicit `"0"` asks for zero hits. Anything else that does not parse
/// to a positive number falls back to the default; large values are clamped.
pub fn page_size(params: &QueryParams) -> usize {
    let raw = params.get_str("page_size").unwrap_or_default();
    if raw == "0" {
        return 0;
    }

    match leading_int(&raw) {
        n if n <= 0 => DEFAULT_PAGE_SIZE,
        n if n as usize > MAX_PAGE_SIZE => MAX_PAGE_SIZE,
        n => n as usize,
    }
}

/// Integer prefix of `s` (`"12abc"` is 12), 0 when there is none
fn leading_int(s: &str) -> i64 {
    let s = s.trim_start();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());

    digits[..end]
        .parse::<i64>()
        .map(|n| sign * n)
        .unwrap_or(if end > 0 { sign * i64::MAX } else { 0 })
}
