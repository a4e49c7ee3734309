use testcontainers::runners::AsyncRunner;
use testcontainers::ContainerAsync;
use testcontainers_modules::mongo::Mongo;

use panya_migrations::config::Settings;
use panya_migrations::db::connection::connect;
use panya_migrations::db::repository::{MongoChannelRepository, MongoItemRepository};

/// Holds a running MongoDB container and repositories bound to it.
///
/// The container lives as long as this struct. When dropped, it is stopped
/// and cleaned up automatically.
pub struct TestEnv {
    _mongo: ContainerAsync<Mongo>,
    pub settings: Settings,
    pub db: mongodb::Database,
    pub channels: MongoChannelRepository,
    pub items: MongoItemRepository,
}

impl TestEnv {
    /// Spin up MongoDB and connect through the same path the binary uses.
    pub async fn start() -> Self {
        let mongo_container = Mongo::default()
            .start()
            .await
            .expect("Failed to start MongoDB container");

        let mongo_port = mongo_container
            .get_host_port_ipv4(27017)
            .await
            .expect("Failed to get MongoDB port");

        let settings = Settings {
            mongodb_uri: format!("mongodb://127.0.0.1:{}", mongo_port),
            database: Some("panya_test".to_string()),
            ..Settings::default()
        };

        let db = connect(&settings).await.expect("Failed to connect to MongoDB");
        let channels = MongoChannelRepository::new(&db, &settings.channels_collection);
        let items = MongoItemRepository::new(&db, &settings.items_collection);

        Self {
            _mongo: mongo_container,
            settings,
            db,
            channels,
            items,
        }
    }

    pub fn collection(&self, name: &str) -> mongodb::Collection<mongodb::bson::Document> {
        self.db.collection(name)
    }

    /// Helper: insert raw documents into a collection.
    pub async fn seed(&self, name: &str, docs: Vec<mongodb::bson::Document>) {
        self.collection(name)
            .insert_many(docs)
            .await
            .expect("Failed to seed documents");
    }

    /// Helper: fetch a document by `_id`.
    pub async fn fetch(&self, name: &str, id: i32) -> mongodb::bson::Document {
        use mongodb::bson::doc;

        self.collection(name)
            .find_one(doc! { "_id": id })
            .await
            .expect("Failed to query document")
            .expect("Document should exist")
    }
}
