use sea_orm::{EntityTrait, QuerySelect, Select};

use fixlane_domain::pagination::PageRequest;

/// Apply `page`/`limit` as `OFFSET`/`LIMIT` to a select.
pub trait Paginate {
    fn page_by(self, page: PageRequest) -> Self;
}

impl<E> Paginate for Select<E>
where
    E: EntityTrait,
{
    fn page_by(self, page: PageRequest) -> Self {
        let page = page.clamped();
        self.offset(page.offset()).limit(u64::from(page.limit))
    }
}
