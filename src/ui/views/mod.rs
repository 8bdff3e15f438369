mod dashboard;
mod post_list;
mod user_detail;
mod user_list;

pub use dashboard::DashboardView;
pub use post_list::PostListView;
pub use user_detail::UserDetailView;
pub use user_list::UserListView;

use crate::api::Resource;
use crate::cache::QueryKey;
use crate::query::Query;
use crate::ui::view::ViewContext;

/// Query for a whole collection under its shared cache key
fn collection_query<T: Resource>(ctx: &ViewContext) -> Query<Vec<T>> {
  let api = ctx.api.clone();
  Query::new(ctx.cache.clone(), QueryKey::collection(T::KIND), move || {
    let api = api.clone();
    async move { api.fetch_collection::<T>().await }
  })
}
