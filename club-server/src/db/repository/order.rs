//! Order Repository
//!
//! Orders snapshot the menu name and price, so later menu edits never change
//! a bill already on the table.

use super::{RepoError, RepoResult, menu, table_session};
use shared::error::ErrorCode;
use shared::models::{Order, OrderCreate};
use sqlx::SqlitePool;

const COLUMNS: &str = "id, store_id, table_session_id, menu_id, item_name, quantity, unit_price, amount, cast_id, guest_id, created_at";

pub async fn find_by_session(
    pool: &SqlitePool,
    store_id: i64,
    session_id: i64,
) -> RepoResult<Vec<Order>> {
    let orders = sqlx::query_as::<_, Order>(&format!(
        "SELECT {COLUMNS} FROM orders WHERE table_session_id = ? AND store_id = ? ORDER BY created_at, id"
    ))
    .bind(session_id)
    .bind(store_id)
    .fetch_all(pool)
    .await?;
    Ok(orders)
}

pub async fn find_by_id(pool: &SqlitePool, store_id: i64, id: i64) -> RepoResult<Option<Order>> {
    let order = sqlx::query_as::<_, Order>(&format!(
        "SELECT {COLUMNS} FROM orders WHERE id = ? AND store_id = ?"
    ))
    .bind(id)
    .bind(store_id)
    .fetch_optional(pool)
    .await?;
    Ok(order)
}

fn ensure_quantity(quantity: i32) -> RepoResult<()> {
    if quantity < 1 {
        return Err(RepoError::Business(
            ErrorCode::InvalidQuantity,
            format!("Quantity must be at least 1, got {quantity}"),
        ));
    }
    Ok(())
}

pub async fn create(
    pool: &SqlitePool,
    store_id: i64,
    session_id: i64,
    data: OrderCreate,
) -> RepoResult<Order> {
    ensure_quantity(data.quantity)?;
    table_session::require_active(pool, store_id, session_id).await?;

    let (item_name, unit_price) = match data.menu_id {
        Some(menu_id) => {
            let menu = menu::find_by_id(pool, store_id, menu_id)
                .await?
                .ok_or_else(|| RepoError::NotFound(format!("Menu {menu_id}")))?;
            if !menu.is_active {
                return Err(RepoError::Business(
                    ErrorCode::MenuInactive,
                    format!("Menu {menu_id} is no longer offered"),
                ));
            }
            (data.item_name.unwrap_or(menu.name), data.unit_price.unwrap_or(menu.price))
        }
        None => match (data.item_name, data.unit_price) {
            (Some(name), Some(price)) => (name, price),
            _ => {
                return Err(RepoError::Validation(
                    "item_name and unit_price are required without menu_id".into(),
                ));
            }
        },
    };
    if unit_price < 0 {
        return Err(RepoError::Validation("unit_price must not be negative".into()));
    }

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO orders (store_id, table_session_id, menu_id, item_name, quantity, unit_price, amount, cast_id, guest_id, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(store_id)
    .bind(session_id)
    .bind(data.menu_id)
    .bind(&item_name)
    .bind(data.quantity)
    .bind(unit_price)
    .bind(unit_price * i64::from(data.quantity))
    .bind(data.cast_id)
    .bind(data.guest_id)
    .bind(shared::util::now_millis())
    .fetch_one(pool)
    .await?;

    find_by_id(pool, store_id, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create order".into()))
}

async fn require_open(pool: &SqlitePool, store_id: i64, id: i64) -> RepoResult<Order> {
    let order = find_by_id(pool, store_id, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Order {id}")))?;
    table_session::require_active(pool, store_id, order.table_session_id).await?;
    Ok(order)
}

/// Change quantity; amount follows the snapshot price
pub async fn update_quantity(
    pool: &SqlitePool,
    store_id: i64,
    id: i64,
    quantity: i32,
) -> RepoResult<Order> {
    ensure_quantity(quantity)?;
    require_open(pool, store_id, id).await?;

    sqlx::query("UPDATE orders SET quantity = ?1, amount = unit_price * ?1 WHERE id = ?2 AND store_id = ?3")
        .bind(quantity)
        .bind(id)
        .bind(store_id)
        .execute(pool)
        .await?;

    find_by_id(pool, store_id, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Order {id}")))
}

pub async fn delete(pool: &SqlitePool, store_id: i64, id: i64) -> RepoResult<bool> {
    require_open(pool, store_id, id).await?;
    sqlx::query("DELETE FROM orders WHERE id = ? AND store_id = ?")
        .bind(id)
        .bind(store_id)
        .execute(pool)
        .await?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::{STORE, pool, session, table};
    use shared::models::{MenuCreate, MenuUpdate};

    fn from_menu(menu_id: i64, quantity: i32) -> OrderCreate {
        OrderCreate {
            menu_id: Some(menu_id),
            item_name: None,
            unit_price: None,
            quantity,
            cast_id: None,
            guest_id: None,
        }
    }

    #[tokio::test]
    async fn test_menu_snapshot_survives_price_change() {
        let pool = pool().await;
        let s = session(&pool, table(&pool, "A").await.id).await;
        let beer = menu::create(
            &pool,
            STORE,
            MenuCreate { name: "Beer".into(), category: None, price: 1000, sort_order: 0 },
        )
        .await
        .unwrap();

        let order = create(&pool, STORE, s.id, from_menu(beer.id, 3)).await.unwrap();
        assert_eq!(order.item_name, "Beer");
        assert_eq!(order.amount, 3000);

        menu::update(&pool, STORE, beer.id, MenuUpdate { price: Some(2000), ..Default::default() })
            .await
            .unwrap();
        let order = update_quantity(&pool, STORE, order.id, 2).await.unwrap();
        assert_eq!(order.unit_price, 1000);
        assert_eq!(order.amount, 2000);
    }

    #[tokio::test]
    async fn test_rejections() {
        let pool = pool().await;
        let s = session(&pool, table(&pool, "A").await.id).await;
        let old = menu::create(
            &pool,
            STORE,
            MenuCreate { name: "Old".into(), category: None, price: 500, sort_order: 0 },
        )
        .await
        .unwrap();
        menu::delete(&pool, STORE, old.id).await.unwrap();

        let err = create(&pool, STORE, s.id, from_menu(old.id, 1)).await.unwrap_err();
        assert!(matches!(err, RepoError::Business(ErrorCode::MenuInactive, _)));

        let err = create(&pool, STORE, s.id, from_menu(old.id, 0)).await.unwrap_err();
        assert!(matches!(err, RepoError::Business(ErrorCode::InvalidQuantity, _)));

        let free_text = OrderCreate {
            menu_id: None,
            item_name: Some("Fruit".into()),
            unit_price: None,
            quantity: 1,
            cast_id: None,
            guest_id: None,
        };
        assert!(matches!(
            create(&pool, STORE, s.id, free_text).await,
            Err(RepoError::Validation(_))
        ));

        table_session::close(&pool, STORE, s.id).await.unwrap();
        let free_text = OrderCreate {
            menu_id: None,
            item_name: Some("Fruit".into()),
            unit_price: Some(3000),
            quantity: 1,
            cast_id: None,
            guest_id: None,
        };
        let err = create(&pool, STORE, s.id, free_text).await.unwrap_err();
        assert!(matches!(err, RepoError::Business(ErrorCode::SessionClosed, _)));
    }

    #[tokio::test]
    async fn test_delete() {
        let pool = pool().await;
        let s = session(&pool, table(&pool, "A").await.id).await;
        let order = create(
            &pool,
            STORE,
            s.id,
            OrderCreate {
                menu_id: None,
                item_name: Some("Fruit".into()),
                unit_price: Some(3000),
                quantity: 1,
                cast_id: None,
                guest_id: None,
            },
        )
        .await
        .unwrap();
        assert!(delete(&pool, STORE, order.id).await.unwrap());
        assert!(find_by_session(&pool, STORE, s.id).await.unwrap().is_empty());
    }
}
