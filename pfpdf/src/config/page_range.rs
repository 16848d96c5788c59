use crate::error::{ImportError, ImportResult};

/// Inclusive, 1-indexed page filter. Either bound may be open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub start: Option<usize>,
    pub end: Option<usize>,
}

impl PageRange {
    /// Build a range, rejecting page 0 and inverted bounds.
    pub fn new(start: Option<usize>, end: Option<usize>) -> ImportResult<Self> {
        let describe = || match (start, end) {
            (Some(s), Some(e)) => format!("{s}-{e}"),
            (Some(s), None) => format!("{s}-"),
            (None, Some(e)) => format!("-{e}"),
            (None, None) => "-".to_string(),
        };

        if start == Some(0) || end == Some(0) {
            return Err(ImportError::InvalidPageRange {
                input: describe(),
                message: "page 0 is invalid (pages start at 1)".to_string(),
            });
        }
        if let (Some(s), Some(e)) = (start, end)
            && s > e
        {
            return Err(ImportError::InvalidPageRange {
                input: describe(),
                message: "start must be <= end".to_string(),
            });
        }

        Ok(Self { start, end })
    }

    /// Parse `START-END`, `START-`, `-END` or a single page `N`.
    pub fn parse(input: &str) -> ImportResult<Self> {
        let invalid = |message: String| ImportError::InvalidPageRange {
            input: input.to_string(),
            message,
        };
        let parse_bound = |s: &str| -> ImportResult<Option<usize>> {
            let s = s.trim();
            if s.is_empty() {
                return Ok(None);
            }
            s.parse::<usize>()
                .map(Some)
                .map_err(|_| invalid(format!("invalid page number: '{s}'")))
        };

        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(invalid("expected START-END".to_string()));
        }

        let (start, end) = match trimmed.split_once('-') {
            Some((start_str, end_str)) => {
                let start = parse_bound(start_str)?;
                let end = parse_bound(end_str)?;
                if start.is_none() && end.is_none() {
                    return Err(invalid("expected START-END".to_string()));
                }
                (start, end)
            }
            None => {
                let page = parse_bound(trimmed)?;
                (page, page)
            }
        };

        Self::new(start, end).map_err(|e| match e {
            ImportError::InvalidPageRange { message, .. } => invalid(message),
            other => other,
        })
    }

    pub fn contains(&self, page: usize) -> bool {
        self.start.is_none_or(|s| page >= s) && self.end.is_none_or(|e| page <= e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_range() {
        let range = PageRange::parse("2-5").unwrap();
        assert_eq!(range, PageRange { start: Some(2), end: Some(5) });
        assert!(!range.contains(1));
        assert!(range.contains(2));
        assert!(range.contains(5));
        assert!(!range.contains(6));
    }

    #[test]
    fn single_page() {
        let range = PageRange::parse("3").unwrap();
        assert!(range.contains(3));
        assert!(!range.contains(2));
        assert!(!range.contains(4));
    }

    #[test]
    fn open_bounds() {
        let from = PageRange::parse("4-").unwrap();
        assert!(from.contains(400));
        assert!(!from.contains(3));

        let until = PageRange::parse("-2").unwrap();
        assert!(until.contains(1));
        assert!(!until.contains(3));
    }

    #[test]
    fn whitespace_tolerance() {
        assert_eq!(
            PageRange::parse(" 1 - 3 ").unwrap(),
            PageRange { start: Some(1), end: Some(3) }
        );
    }

    #[test]
    fn inverted_range_rejected() {
        let err = PageRange::parse("5-2").unwrap_err();
        assert!(err.to_string().contains("start must be <= end"));
    }

    #[test]
    fn malformed_rejected() {
        for input in ["", "-", "a-b", "1-2-3", "two", "1,3"] {
            assert!(
                matches!(
                    PageRange::parse(input),
                    Err(ImportError::InvalidPageRange { .. })
                ),
                "expected {input:?} to be rejected"
            );
        }
    }

    #[test]
    fn page_zero_invalid() {
        let err = PageRange::parse("0-3").unwrap_err();
        assert!(err.to_string().contains("page 0 is invalid"));
    }
}
