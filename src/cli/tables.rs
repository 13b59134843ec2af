use crate::{config, error, info, management::TrackStore, success, utils, warning};

pub async fn list_tables() {
    let store = match TrackStore::connect(&config::database_path()).await {
        Ok(store) => store,
        Err(e) => error!("Cannot open database: {}", e),
    };

    match store.list_tables().await {
        Ok(tables) if tables.is_empty() => info!("No saved tables."),
        Ok(tables) => {
            for table in tables {
                println!("{table}");
            }
        }
        Err(e) => error!("Cannot list tables: {}", e),
    }
    store.close().await;
}

pub async fn drop_table(name: String) {
    let store = match TrackStore::connect(&config::database_path()).await {
        Ok(store) => store,
        Err(e) => error!("Cannot open database: {}", e),
    };

    let table = utils::table_name(&name);
    match store.drop_table(&table).await {
        Ok(true) => success!("Table {} has been deleted.", table),
        Ok(false) => warning!("Table {} does not exist.", table),
        Err(e) => error!("Table {} has not been deleted: {}", table, e),
    }
    store.close().await;
}
