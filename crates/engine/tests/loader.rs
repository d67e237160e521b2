use std::sync::Mutex;

use api_types::{group::GroupDto, order::OrderDto, present::Present, user::UserDto};
use engine::{
    Applied, Backend, ClientError, Credentials, ListView, Listing, OrderStatus, PageQuery,
    loader::{load_gifts, load_groups, load_orders, load_users},
};

#[derive(Default)]
struct FakeBackend {
    presents: Vec<Present>,
    orders: Vec<OrderDto>,
    users: Vec<UserDto>,
    groups: Vec<GroupDto>,
    unauthorized: bool,
    calls: Mutex<Vec<(&'static str, PageQuery)>>,
}

impl FakeBackend {
    fn serve<T: Clone>(
        &self,
        entity: &'static str,
        items: &[T],
        query: PageQuery,
    ) -> Result<Listing<T>, ClientError> {
        self.calls.lock().unwrap().push((entity, query));
        if self.unauthorized {
            return Err(ClientError::Unauthorized);
        }
        Ok(match query {
            PageQuery::All => Listing::from_all(items.to_vec()),
            PageQuery::Page { index, size } => {
                let size = size as usize;
                Listing {
                    items: items
                        .iter()
                        .skip(index as usize * size)
                        .take(size)
                        .cloned()
                        .collect(),
                    total_pages: items.len().div_ceil(size) as u32,
                    total_elements: items.len() as u64,
                }
            }
        })
    }

    fn calls(&self) -> Vec<(&'static str, PageQuery)> {
        self.calls.lock().unwrap().clone()
    }
}

impl Backend for FakeBackend {
    async fn orders(
        &self,
        _credentials: &Credentials,
        query: PageQuery,
    ) -> Result<Listing<OrderDto>, ClientError> {
        self.serve("orders", &self.orders, query)
    }

    async fn presents(
        &self,
        _credentials: &Credentials,
        query: PageQuery,
    ) -> Result<Listing<Present>, ClientError> {
        self.serve("presents", &self.presents, query)
    }

    async fn users(
        &self,
        _credentials: &Credentials,
        query: PageQuery,
    ) -> Result<Listing<UserDto>, ClientError> {
        self.serve("users", &self.users, query)
    }

    async fn groups(
        &self,
        _credentials: &Credentials,
        query: PageQuery,
    ) -> Result<Listing<GroupDto>, ClientError> {
        self.serve("groups", &self.groups, query)
    }
}

fn present(id: i64, name: &str) -> Present {
    Present {
        id,
        name: name.to_string(),
        price: 30,
        stock: 2,
        photos: vec![],
    }
}

fn order(id: i64, present_id: i64, status: &str) -> OrderDto {
    OrderDto {
        id,
        present_id,
        customer_name: format!("Cliente {id}"),
        order_date: "2024-12-01T09:00:00".to_string(),
        status: status.to_string(),
    }
}

fn shop() -> FakeBackend {
    FakeBackend {
        presents: vec![present(1, "Tazza"), present(2, "Sciarpa")],
        orders: vec![
            order(10, 1, "PENDING"),
            order(11, 2, "CONFIRMED"),
            order(12, 7, "DELIVERED"),
            order(13, 1, "CANCELLED"),
            order(14, 2, "PENDING"),
        ],
        users: vec![UserDto {
            id: 1,
            username: "admin".to_string(),
            email: Some("admin@example.com".to_string()),
            role: Some("ADMIN".to_string()),
            group_id: None,
        }],
        groups: vec![GroupDto {
            id: 3,
            name: "Staff".to_string(),
            description: None,
            user_ids: vec![1, 2],
        }],
        ..FakeBackend::default()
    }
}

fn creds() -> Credentials {
    Credentials::basic("anna", "pw")
}

#[tokio::test]
async fn orders_resolve_gift_names_from_full_collection() {
    let backend = shop();
    let listing = load_orders(&backend, &creds(), PageQuery::Page { index: 0, size: 2 })
        .await
        .unwrap();

    assert_eq!(listing.items.len(), 2);
    assert_eq!(listing.items[0].gift_name, "Tazza");
    assert_eq!(listing.items[1].gift_name, "Sciarpa");
    assert_eq!(listing.items[1].status, OrderStatus::Confirmed);
    assert_eq!(listing.total_pages, 3);
    assert_eq!(listing.total_elements, 5);

    assert_eq!(
        backend.calls(),
        vec![
            ("presents", PageQuery::All),
            ("orders", PageQuery::Page { index: 0, size: 2 }),
        ]
    );
}

#[tokio::test]
async fn order_with_unknown_gift_gets_placeholder() {
    let backend = shop();
    let listing = load_orders(&backend, &creds(), PageQuery::Page { index: 1, size: 2 })
        .await
        .unwrap();

    let unknown = listing.items.iter().find(|row| row.id == 12).unwrap();
    assert!(unknown.gift_name.contains('7'));
    assert_eq!(unknown.status, OrderStatus::Delivered);
}

#[tokio::test]
async fn show_all_returns_everything_as_one_page() {
    let backend = shop();
    let listing = load_orders(&backend, &creds(), PageQuery::All).await.unwrap();
    assert_eq!(listing.items.len(), 5);
    assert_eq!(listing.total_pages, 1);
    assert_eq!(listing.total_elements, 5);
}

#[tokio::test]
async fn every_loader_surfaces_unauthorized() {
    let backend = FakeBackend {
        unauthorized: true,
        ..shop()
    };
    let query = PageQuery::Page { index: 0, size: 10 };

    assert!(matches!(
        load_orders(&backend, &creds(), query).await,
        Err(ClientError::Unauthorized)
    ));
    assert!(matches!(
        load_gifts(&backend, &creds(), query).await,
        Err(ClientError::Unauthorized)
    ));
    assert!(matches!(
        load_users(&backend, &creds(), query).await,
        Err(ClientError::Unauthorized)
    ));
    assert!(matches!(
        load_groups(&backend, &creds(), query).await,
        Err(ClientError::Unauthorized)
    ));
}

#[tokio::test]
async fn users_and_groups_map_to_rows() {
    let backend = shop();
    let users = load_users(&backend, &creds(), PageQuery::All).await.unwrap();
    assert_eq!(users.items[0].username, "admin");
    assert_eq!(users.items[0].group, "-");

    let groups = load_groups(&backend, &creds(), PageQuery::All).await.unwrap();
    assert_eq!(groups.items[0].members, 2);
}

#[tokio::test]
async fn list_view_follows_show_all_toggle() {
    let backend = shop();
    let mut view = ListView::new(2);

    let ticket = view.begin();
    let result = load_gifts(&backend, &creds(), ticket.query).await;
    assert!(matches!(view.apply(ticket, result), Applied::Updated));
    assert_eq!(view.pager.total_pages, 1);

    view.pager.toggle_show_all();
    let ticket = view.begin();
    let result = load_gifts(&backend, &creds(), ticket.query).await;
    view.apply(ticket, result);
    assert_eq!(view.items.len(), 2);

    view.pager.toggle_show_all();
    let ticket = view.begin();
    assert_eq!(ticket.query, PageQuery::Page { index: 0, size: 2 });
    let result = load_gifts(&backend, &creds(), ticket.query).await;
    view.apply(ticket, result);

    assert_eq!(
        backend.calls(),
        vec![
            ("presents", PageQuery::Page { index: 0, size: 2 }),
            ("presents", PageQuery::All),
            ("presents", PageQuery::Page { index: 0, size: 2 }),
        ]
    );
}

#[tokio::test]
async fn overlapping_loads_apply_only_the_latest() {
    let backend = shop();
    let mut view = ListView::new(2);
    view.pager.total_pages = 3;

    let first = view.begin();
    view.pager.next_page();
    let second = view.begin();

    let second_result = load_orders(&backend, &creds(), second.query).await;
    let first_result = load_orders(&backend, &creds(), first.query).await;

    assert!(matches!(view.apply(second, second_result), Applied::Updated));
    assert!(matches!(view.apply(first, first_result), Applied::Stale));
    assert_eq!(
        view.items.iter().map(|row| row.id).collect::<Vec<_>>(),
        vec![12, 13]
    );
}
