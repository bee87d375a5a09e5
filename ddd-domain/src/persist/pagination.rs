use serde::{Deserialize, Serialize};

/// 排序方向
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// 解析排序参数：缺省或 `asc`（忽略大小写）为升序，其余一律降序
    pub fn from_sorting(sorting: Option<&str>) -> Self {
        match sorting {
            None => Self::Asc,
            Some(s) if s.eq_ignore_ascii_case("asc") => Self::Asc,
            Some(_) => Self::Desc,
        }
    }
}

/// 分页参数
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub skip: usize,
    pub take: usize,
    pub sorting: Option<String>,
}

impl Pagination {
    pub fn new(skip: usize, take: usize) -> Self {
        Self {
            skip,
            take,
            sorting: None,
        }
    }

    pub fn sorted(mut self, sorting: impl Into<String>) -> Self {
        self.sorting = Some(sorting.into());
        self
    }

    pub fn direction(&self) -> SortDirection {
        SortDirection::from_sorting(self.sorting.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorting_defaults_to_ascending() {
        assert_eq!(SortDirection::from_sorting(None), SortDirection::Asc);
        assert_eq!(SortDirection::from_sorting(Some("ASC")), SortDirection::Asc);
        assert_eq!(SortDirection::from_sorting(Some("desc")), SortDirection::Desc);
        assert_eq!(SortDirection::from_sorting(Some("whatever")), SortDirection::Desc);
        assert_eq!(Pagination::new(0, 10).direction(), SortDirection::Asc);
    }
}
