//! Permission-filtered, ordered and paginated target listing.

use anyhow::Result;
use log::info;
use std::time::Instant;
use thiserror::Error;

use crate::common::{PAGE_SIZE, VIEW_TARGET_PERMISSION};
use crate::database::ops::store::TargetStore;
use crate::models::filter::FilterParams;
use crate::models::target::Target;
use crate::models::target_list::TargetList;
use crate::models::user::User;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccessDenied {
    #[error("Login required")]
    Unauthenticated,
    #[error("User '{username}' lacks the '{permission}' permission")]
    MissingPermission {
        username: String,
        permission: &'static str,
    },
}

/// The permission gate. Must pass before any record is read.
pub fn authorize(user: Option<&User>) -> Result<&User, AccessDenied> {
    match user {
        None => Err(AccessDenied::Unauthenticated),
        Some(user) if user.has_perm(VIEW_TARGET_PERMISSION) => Ok(user),
        Some(user) => Err(AccessDenied::MissingPermission {
            username: user.username.clone(),
            permission: VIEW_TARGET_PERMISSION,
        }),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRequest {
    Number(i64),
    Last,
}

impl PageRequest {
    /// Missing or unparsable values fall back to the first page.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("last") => PageRequest::Last,
            Some(raw) => raw.parse().map(PageRequest::Number).unwrap_or(PageRequest::Number(1)),
            None => PageRequest::Number(1),
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest::Number(1)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListingPage<T> {
    pub items: Vec<T>,
    /// 1-based, always within `1..=num_pages`.
    pub number: usize,
    pub num_pages: usize,
    pub total_count: usize,
}

impl<T> ListingPage<T> {
    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    /// 1-based index of the first item on this page, 0 when empty.
    pub fn start_index(&self) -> usize {
        if self.total_count == 0 {
            0
        } else {
            (self.number - 1) * PAGE_SIZE + 1
        }
    }
}

/// Slice `items` to the requested page, clamping out-of-range requests.
pub fn paginate<T>(items: Vec<T>, request: PageRequest) -> ListingPage<T> {
    let total_count = items.len();
    let num_pages = total_count.div_ceil(PAGE_SIZE).max(1);
    let number = match request {
        PageRequest::Last => num_pages,
        PageRequest::Number(n) if n < 1 => 1,
        PageRequest::Number(n) => (n as u64).min(num_pages as u64) as usize,
    };
    let items = items
        .into_iter()
        .skip((number - 1) * PAGE_SIZE)
        .take(PAGE_SIZE)
        .collect();
    ListingPage {
        items,
        number,
        num_pages,
        total_count,
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListingRequest {
    pub filter: FilterParams,
    pub page: PageRequest,
}

#[derive(Debug, Clone)]
pub struct ListingContext {
    pub page: ListingPage<Target>,
    pub target_lists: Vec<TargetList>,
    /// Filter parameters re-encoded for pagination links, `page` excluded.
    pub query_string: String,
    pub filter: FilterParams,
}

/// Resolve the page of targets `user` may see.
///
/// Fails with [`AccessDenied`] before touching the store when the user is
/// missing or lacks the view permission.
pub fn resolve_listing(
    store: &TargetStore,
    user: Option<&User>,
    request: &ListingRequest,
) -> Result<ListingContext> {
    let user = authorize(user)?;
    let start_time = Instant::now();

    let mut targets = store.read_targets()?;

    if !user.is_superuser {
        let granted = store.granted_target_ids(&user.principals())?;
        targets.retain(|target| granted.contains(&target.id));
    }

    if let Some(expression) = request
        .filter
        .to_expression(|list_id| store.read_target_list_members(list_id))?
    {
        let filter = expression.generate_filter();
        targets.retain(|target| filter(target));
    }

    // Stable: equal timestamps keep the id order of the scan.
    targets.sort_by(|a, b| b.created.cmp(&a.created));

    let page = paginate(targets, request.page);
    let target_lists = store.read_target_lists()?;

    info!(
        duration = &*format!("{:?}", start_time.elapsed());
        "Listed page {}/{} ({} targets) for {}",
        page.number,
        page.num_pages,
        page.total_count,
        user.username
    );

    Ok(ListingContext {
        page,
        target_lists,
        query_string: request.filter.query_string(),
        filter: request.filter.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn user(permissions: &[&str]) -> User {
        User {
            username: "kim".to_string(),
            is_superuser: false,
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
            groups: BTreeSet::new(),
        }
    }

    #[test]
    fn gate_rejects_missing_and_unprivileged_users() {
        assert_eq!(authorize(None), Err(AccessDenied::Unauthenticated));
        assert!(matches!(
            authorize(Some(&user(&[]))),
            Err(AccessDenied::MissingPermission { .. })
        ));
        assert!(authorize(Some(&user(&[VIEW_TARGET_PERMISSION]))).is_ok());
    }

    #[test]
    fn page_parsing_is_lenient() {
        assert_eq!(PageRequest::parse(None), PageRequest::Number(1));
        assert_eq!(PageRequest::parse(Some("3")), PageRequest::Number(3));
        assert_eq!(PageRequest::parse(Some("last")), PageRequest::Last);
        assert_eq!(PageRequest::parse(Some("three")), PageRequest::Number(1));
        assert_eq!(PageRequest::parse(Some("-2")), PageRequest::Number(-2));
    }

    #[test]
    fn pages_clamp_to_valid_range() {
        let items: Vec<u32> = (0..60).collect();

        let page = paginate(items.clone(), PageRequest::Number(2));
        assert_eq!(page.items, (25..50).collect::<Vec<_>>());
        assert!(page.has_previous() && page.has_next());

        let page = paginate(items.clone(), PageRequest::Number(99));
        assert_eq!((page.number, page.items.len()), (3, 10));
        assert_eq!(page.start_index(), 51);

        let page = paginate(items.clone(), PageRequest::Number(0));
        assert_eq!(page.number, 1);

        let page = paginate(items, PageRequest::Last);
        assert_eq!(page.number, 3);
    }

    #[test]
    fn empty_listing_has_one_empty_page() {
        let page = paginate(Vec::<u32>::new(), PageRequest::Number(5));
        assert_eq!((page.number, page.num_pages, page.total_count), (1, 1, 0));
        assert!(page.items.is_empty());
        assert_eq!(page.start_index(), 0);
    }

    #[test]
    fn equal_timestamps_keep_id_order_across_requests() {
        use crate::models::target::NewTarget;
        use chrono::{TimeZone, Utc};

        let store = TargetStore::in_memory().unwrap();
        let created = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        for name in ["A", "B", "C"] {
            store
                .insert_target(NewTarget::non_sidereal(name).created(created))
                .unwrap();
        }
        store
            .insert_target(NewTarget::non_sidereal("Newer").created(created + chrono::Duration::hours(1)))
            .unwrap();

        let mut admin = user(&[]);
        admin.is_superuser = true;
        let request = ListingRequest::default();

        let first = resolve_listing(&store, Some(&admin), &request).unwrap();
        let names: Vec<_> = first.page.items.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Newer", "A", "B", "C"]);

        let second = resolve_listing(&store, Some(&admin), &request).unwrap();
        assert_eq!(second.page, first.page);
        assert_eq!(second.query_string, first.query_string);
    }

    #[test]
    fn gate_runs_before_the_store_is_read() {
        let store = TargetStore::in_memory().unwrap();
        let err = resolve_listing(&store, Some(&user(&[])), &ListingRequest::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AccessDenied>(),
            Some(AccessDenied::MissingPermission { .. })
        ));
    }
}
