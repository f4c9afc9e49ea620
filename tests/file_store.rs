//! Persistence of settings and cache entries across store reopenings.

use plexboxd::availability::{AvailabilityCache, CachedAvailability, Status};
use plexboxd::store::{FileStore, KvStore, ServerConfig, Settings, StoreError};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn settings_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("plexboxd.json");

    {
        let store = Arc::new(FileStore::open(path.clone()).await.unwrap());
        let settings = Settings::new(store);
        settings
            .add_server(ServerConfig::new("Home", "http://home.local/", "k1"))
            .await
            .unwrap();
        settings
            .add_server(ServerConfig::new("Cabin", "http://cabin.local", "k2"))
            .await
            .unwrap();
        settings.set_cache_expiration_hours(6).await.unwrap();
        settings.set_extension_enabled(false).await.unwrap();
    }

    let store = Arc::new(FileStore::open(path.clone()).await.unwrap());
    let settings = Settings::new(store);
    let names: Vec<String> = settings
        .servers()
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.name)
        .collect();
    assert_eq!(names, ["Cabin", "Home"]);
    assert_eq!(settings.cache_expiration_hours().await.unwrap(), 6);
    assert!(!settings.extension_enabled().await.unwrap());
    assert!(!path.with_extension("json.tmp").exists());
}

#[tokio::test]
async fn stored_document_uses_flat_keys() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plexboxd.json");
    let store = Arc::new(FileStore::open(path.clone()).await.unwrap());

    AvailabilityCache::new(store.clone())
        .put(
            "Home",
            "438631",
            CachedAvailability {
                status: Status::Available,
                id: Some("438631".into()),
                plex_url: Some("https://app.plex.tv/x".into()),
            },
        )
        .await
        .unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let entry = &raw["movie_Home_438631"];
    assert_eq!(entry["data"]["status"], "available");
    assert_eq!(entry["data"]["plexUrl"], "https://app.plex.tv/x");
    assert!(entry["timestamp"].as_i64().unwrap() > 0);

    let reopened = Arc::new(FileStore::open(path).await.unwrap());
    let hit = AvailabilityCache::new(reopened)
        .get("Home", "438631", Duration::from_secs(3600))
        .await
        .unwrap();
    assert_eq!(hit.map(|h| h.status), Some(Status::Available));
}

#[tokio::test]
async fn clearing_cache_keeps_configuration() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(
        FileStore::open(dir.path().join("plexboxd.json"))
            .await
            .unwrap(),
    );
    let settings = Settings::new(store.clone());
    let cache = AvailabilityCache::new(store.clone());

    settings
        .add_server(ServerConfig::new("Home", "http://home.local", "k"))
        .await
        .unwrap();
    for movie in ["438631", "841"] {
        cache
            .put(
                "Home",
                movie,
                CachedAvailability {
                    status: Status::Unavailable,
                    id: Some(movie.into()),
                    plex_url: None,
                },
            )
            .await
            .unwrap();
    }

    assert_eq!(cache.clear().await.unwrap(), 2);
    assert_eq!(store.keys().await.unwrap(), ["servers"]);
    assert_eq!(settings.servers().await.unwrap().len(), 1);
}

#[tokio::test]
async fn corrupt_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plexboxd.json");
    std::fs::write(&path, "{ not json").unwrap();

    let err = FileStore::open(path).await.unwrap_err();
    assert!(matches!(err, StoreError::Corrupt(_)));
}
