//! Offset pagination and sorting.

use std::fmt;
use std::str::FromStr;

use crate::validation::Violation;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 2000;

/// Bounds applied when turning raw query values into a [`PageRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub default_size: u32,
    pub max_size: u32,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_size: DEFAULT_PAGE_SIZE,
            max_size: MAX_PAGE_SIZE,
        }
    }
}

/// Sortable note properties, named as they appear on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortProperty {
    Id,
    Username,
    Content,
    CreatedAt,
    LastModifiedAt,
    Version,
}

impl SortProperty {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortProperty::Id => "id",
            SortProperty::Username => "username",
            SortProperty::Content => "content",
            SortProperty::CreatedAt => "createdAt",
            SortProperty::LastModifiedAt => "lastModifiedAt",
            SortProperty::Version => "version",
        }
    }
}

impl FromStr for SortProperty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(SortProperty::Id),
            "username" => Ok(SortProperty::Username),
            "content" => Ok(SortProperty::Content),
            "createdAt" => Ok(SortProperty::CreatedAt),
            "lastModifiedAt" => Ok(SortProperty::LastModifiedAt),
            "version" => Ok(SortProperty::Version),
            _ => Err(format!("unknown property: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(Direction::Asc),
            "desc" => Ok(Direction::Desc),
            _ => Err(format!("unknown direction: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub property: SortProperty,
    pub direction: Direction,
}

impl FromStr for Sort {
    type Err = String;

    /// Parses `property` or `property,direction`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(',').map(str::trim);
        let property = parts.next().unwrap_or_default().parse()?;
        let direction = match parts.next() {
            Some(d) if !d.is_empty() => d.parse()?,
            _ => Direction::default(),
        };
        if parts.next().is_some() {
            return Err(format!("invalid sort: {s}"));
        }
        Ok(Self {
            property,
            direction,
        })
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dir = match self.direction {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        };
        write!(f, "{},{dir}", self.property.as_str())
    }
}

/// A zero-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
    pub sort: Option<Sort>,
}

impl PageRequest {
    pub fn of(page: u32, size: u32) -> Self {
        Self {
            page,
            size,
            sort: None,
        }
    }

    /// Build a request from raw query values, clamping out-of-range numbers
    /// and rejecting unparseable sorts.
    pub fn from_query(
        page: Option<i64>,
        size: Option<i64>,
        sort: Option<&str>,
        limits: PageLimits,
    ) -> Result<Self, Violation> {
        let page = page
            .filter(|p| *p > 0)
            .map(|p| p.min(u32::MAX as i64) as u32)
            .unwrap_or(0);
        let size = match size {
            Some(s) if s >= 1 => s.min(limits.max_size as i64) as u32,
            _ => limits.default_size,
        };
        let sort = match sort.map(str::trim) {
            Some(s) if !s.is_empty() => Some(s.parse().map_err(|e| Violation::new("sort", e))?),
            _ => None,
        };
        Ok(Self { page, size, sort })
    }

    /// Rows to skip, saturating so it always fits a SQL `OFFSET`.
    pub fn offset(&self) -> i64 {
        i64::try_from(u64::from(self.page) * u64::from(self.size)).unwrap_or(i64::MAX)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::of(0, DEFAULT_PAGE_SIZE)
    }
}

/// One page of results plus the totals needed to navigate the rest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub number: u32,
    pub size: u32,
    pub total_elements: u64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: &PageRequest, total_elements: u64) -> Self {
        Self {
            content,
            number: request.page,
            size: request.size,
            total_elements,
        }
    }

    pub fn total_pages(&self) -> u64 {
        if self.size == 0 {
            return 0;
        }
        self.total_elements.div_ceil(self.size as u64)
    }

    pub fn number_of_elements(&self) -> usize {
        self.content.len()
    }

    pub fn is_first(&self) -> bool {
        self.number == 0
    }

    pub fn is_last(&self) -> bool {
        self.number as u64 + 1 >= self.total_pages()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            number: self.number,
            size: self.size,
            total_elements: self.total_elements,
        }
    }
}
