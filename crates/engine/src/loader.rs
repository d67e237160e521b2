//! List loaders: one fetch (or two, for orders) turned into display rows.
use crate::{
    client::Backend,
    credentials::Credentials,
    error::ClientError,
    lookup::GiftLookup,
    paging::{Listing, PageQuery},
    views::{GiftRow, GroupRow, OrderRow, UserRow},
};

/// Loads one page of orders with gift names resolved.
///
/// The full gift collection is fetched first: orders only carry the gift id.
pub async fn load_orders<B: Backend>(
    backend: &B,
    credentials: &Credentials,
    query: PageQuery,
) -> Result<Listing<OrderRow>, ClientError> {
    let gifts = backend.presents(credentials, PageQuery::All).await?;
    let lookup = GiftLookup::new(&gifts.items);
    let orders = backend.orders(credentials, query).await?;
    tracing::debug!(
        gifts = lookup.len(),
        orders = orders.items.len(),
        "orders loaded"
    );
    Ok(orders.map(|order| OrderRow::from_dto(order, &lookup)))
}

pub async fn load_gifts<B: Backend>(
    backend: &B,
    credentials: &Credentials,
    query: PageQuery,
) -> Result<Listing<GiftRow>, ClientError> {
    Ok(backend.presents(credentials, query).await?.map(GiftRow::from))
}

pub async fn load_users<B: Backend>(
    backend: &B,
    credentials: &Credentials,
    query: PageQuery,
) -> Result<Listing<UserRow>, ClientError> {
    Ok(backend.users(credentials, query).await?.map(UserRow::from))
}

pub async fn load_groups<B: Backend>(
    backend: &B,
    credentials: &Credentials,
    query: PageQuery,
) -> Result<Listing<GroupRow>, ClientError> {
    Ok(backend.groups(credentials, query).await?.map(GroupRow::from))
}
