//! End-to-end sale flow: admin seeds the menu, cashier sells, cook works
//! the queue, every mutation lands on the remote mirror.

use brasa_server::{Config, MemoryRemote, RemoteStore, ServerState};
use shared::models::{ItemOptions, MaterialCreate, ProductCreate, RecipeLine};
use shared::order::OrderStatus;
use std::sync::Arc;

fn test_state(dir: &tempfile::TempDir, remote: Arc<MemoryRemote>) -> ServerState {
    let config = Config {
        work_dir: dir.path().to_string_lossy().into_owned(),
        store_id: "test.stand".into(),
        ..Config::default()
    };
    ServerState::initialize_with_remote(&config, Some(remote as Arc<dyn RemoteStore>)).unwrap()
}

#[tokio::test]
async fn sale_reaches_kitchen_and_remote() {
    let dir = tempfile::tempdir().unwrap();
    let remote = Arc::new(MemoryRemote::new());
    let state = test_state(&dir, Arc::clone(&remote));

    // Admin seeds inventory and menu
    let (bread, _) = state
        .inventory
        .add_material(MaterialCreate {
            name: "Pan".into(),
            qty: 20.0,
        })
        .await
        .unwrap();
    let (patty, _) = state
        .inventory
        .add_material(MaterialCreate {
            name: "Carne".into(),
            qty: 20.0,
        })
        .await
        .unwrap();
    let burger = state
        .catalog
        .add(ProductCreate {
            name: "Hamburguesa".into(),
            price: 14000.0,
            recipe: Some(vec![
                RecipeLine {
                    material_id: bread.id.clone(),
                    qty: 1.0,
                },
                RecipeLine {
                    material_id: patty.id.clone(),
                    qty: 1.0,
                },
            ]),
        })
        .unwrap();
    let soda = state
        .catalog
        .add(ProductCreate {
            name: "Gaseosa".into(),
            price: 2000.0,
            recipe: None,
        })
        .unwrap();

    // Store key derives from the configured store id
    assert_eq!(state.config.store_key(), "test_stand");
    // Materials were mirrored under the store namespace
    assert!(remote.leaf(&format!("inventories/test_stand/{}", bread.id)).is_some());

    // Cashier builds the cart: 2 burgers + 1 soda
    state
        .sales
        .add_to_cart(&burger, None, ItemOptions::default())
        .unwrap();
    state
        .sales
        .add_to_cart(&burger, None, ItemOptions::default())
        .unwrap();
    state
        .sales
        .add_to_cart(&soda, None, ItemOptions::default())
        .unwrap();

    let receipt = state.checkout.confirm_sale(None).await.unwrap().unwrap();
    assert_eq!(receipt.sale.total, 30000.0);
    assert_eq!(receipt.orders.len(), 2);
    assert_eq!(state.inventory.find(&bread.id).unwrap().qty, 18.0);

    // The remote saw the sale and the orders
    let sales_tree = remote.get("sales").await.unwrap().unwrap();
    assert_eq!(sales_tree.as_object().unwrap().len(), 1);
    for order in &receipt.orders {
        let leaf = remote.leaf(&format!("orders/{}", order.id)).unwrap();
        assert_eq!(leaf.get("status").unwrap(), "RECEIVED");
    }

    // Cook works the burger order through the chain
    let burger_order = receipt
        .orders
        .iter()
        .find(|o| o.product == "Hamburguesa")
        .unwrap();
    state
        .orders
        .advance(&burger_order.id, OrderStatus::Preparing)
        .await
        .unwrap();
    state
        .orders
        .advance(&burger_order.id, OrderStatus::Closed)
        .await
        .unwrap();

    assert_eq!(state.orders.active().len(), 1);
    assert_eq!(state.orders.closed().len(), 1);
    let leaf = remote.leaf(&format!("orders/{}", burger_order.id)).unwrap();
    assert_eq!(leaf.get("status").unwrap(), "CLOSED");
}

#[tokio::test]
async fn state_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let remote = Arc::new(MemoryRemote::new());

    let soda_id = {
        let state = test_state(&dir, Arc::clone(&remote));
        let soda = state
            .catalog
            .add(ProductCreate {
                name: "Gaseosa".into(),
                price: 2000.0,
                recipe: None,
            })
            .unwrap();
        state
            .sales
            .add_to_cart(&soda, None, ItemOptions::default())
            .unwrap();
        state.checkout.confirm_sale(None).await.unwrap().unwrap();
        soda.id
        // state dropped here, releasing the embedded database
    };

    let state = test_state(&dir, remote);
    assert_eq!(state.catalog.find(&soda_id).unwrap().name, "Gaseosa");
    assert_eq!(state.sales.current().len(), 1);
    assert_eq!(state.sales.all_time().len(), 1);
    assert_eq!(state.orders.all().len(), 1);
    assert!(state.sales.cart().is_empty());
}

#[tokio::test]
async fn outage_queues_writes_until_flush() {
    let dir = tempfile::tempdir().unwrap();
    let remote = Arc::new(MemoryRemote::new());
    let state = test_state(&dir, Arc::clone(&remote));

    let soda = state
        .catalog
        .add(ProductCreate {
            name: "Gaseosa".into(),
            price: 2000.0,
            recipe: None,
        })
        .unwrap();
    state
        .sales
        .add_to_cart(&soda, None, ItemOptions::default())
        .unwrap();

    remote.set_failing(true);
    let receipt = state.checkout.confirm_sale(None).await.unwrap().unwrap();
    assert_eq!(receipt.mirror, brasa_server::MirrorStatus::Queued);
    assert!(state.mirror.pending() > 0);
    // The sale still landed locally
    assert_eq!(state.sales.current().len(), 1);

    remote.set_failing(false);
    let stats = state.mirror.flush_once().await;
    assert!(stats.delivered > 0);
    assert_eq!(state.mirror.pending(), 0);
    let sales_tree = remote.get("sales").await.unwrap().unwrap();
    assert_eq!(sales_tree.as_object().unwrap().len(), 1);
}
