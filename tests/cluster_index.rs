use std::thread;
use vacancy_map::compute::geojson::{features_to_geojson, features_to_geojson_string};
use vacancy_map::filter::{Range, ShopFilter};
use vacancy_map::prelude::*;

const FEED: &str = r#"[
    {"id": "bj-01", "name": "Seomyeon corner", "latitude": 35.1578, "longitude": 129.0590,
     "address": "부산광역시 부산진구 중앙대로 672", "shopType": "retail", "monthlyRent": 180, "area": 25},
    {"id": "bj-02", "name": "Seomyeon alley", "latitude": 35.1581, "longitude": 129.0594,
     "address": "부산광역시 부산진구 서전로 10", "shopType": "restaurant", "monthlyRent": 140, "area": 18},
    {"id": "bj-03", "name": "Jeonpo cafe street", "latitude": 35.1552, "longitude": 129.0641,
     "address": "부산광역시 부산진구 전포대로 209", "shopType": "restaurant", "monthlyRent": 95, "area": 12},
    {"id": "hd-01", "name": "Haeundae beachfront", "latitude": 35.1587, "longitude": 129.1604,
     "address": "부산광역시 해운대구 해운대해변로 264", "shopType": "restaurant", "monthlyRent": 450, "area": 40},
    {"id": "hd-02", "name": "Centum office", "latitude": 35.1699, "longitude": 129.1310,
     "address": "부산광역시 해운대구 센텀중앙로 79", "shopType": "office", "monthlyRent": 300, "area": 60},
    {"id": "broken", "name": "No coordinates", "shopType": "etc"}
]"#;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn busan() -> MapBounds {
    MapBounds::new(128.9, 35.0, 129.3, 35.3)
}

fn feed() -> Vec<ShopRecord> {
    serde_json::from_str(FEED).expect("feed should parse")
}

#[test]
fn test_feed_to_index() {
    init_logging();
    let index = ClusterIndex::build(feed(), IndexConfig::default()).expect("Failed to build index");

    assert_eq!(index.len(), 5);
    assert_eq!(index.skipped(), 1);
    assert!(index.shop("broken").is_none());
    assert_eq!(index.shop("hd-01").map(|s| s.monthly_rent), Some(450.0));

    // Every valid shop is accounted for exactly once at every zoom.
    for zoom in 0..=18 {
        let features = index.query(&busan(), zoom);
        let total: usize = features.iter().map(Feature::point_count).sum();
        assert_eq!(total, 5, "zoom {zoom}");
    }
}

#[test]
fn test_seomyeon_cluster_splits_when_expanded() {
    init_logging();
    let index = ClusterIndex::build(feed(), IndexConfig::default()).expect("Failed to build index");

    let features = index.query(&busan(), 11);
    let cluster = features
        .iter()
        .filter_map(Feature::as_cluster)
        .find(|c| c.leaves(&index).any(|s| s.id == "bj-01"))
        .expect("Seomyeon shops should cluster at zoom 11");
    assert!(cluster.point_count >= 2);

    let expansion = index.get_expansion_zoom(cluster.id).expect("Known cluster");
    assert!(expansion > 11);

    let mut leaves: Vec<String> = index
        .get_leaves(cluster.id, usize::MAX, 0)
        .expect("Known cluster")
        .iter()
        .map(|s| s.id.clone())
        .collect();
    leaves.sort();
    let mut from_feature: Vec<String> = cluster.leaves(&index).map(|s| s.id.clone()).collect();
    from_feature.sort();
    assert_eq!(leaves, from_feature);

    let children = index.get_children(cluster.id).expect("Known cluster");
    assert!(children.len() >= 2);
    let child_total: usize = children.iter().map(Feature::point_count).sum();
    assert_eq!(child_total, cluster.point_count);
}

#[test]
fn test_filtered_reload() {
    init_logging();
    let filter = ShopFilter::default()
        .with_categories([ShopCategory::Restaurant])
        .with_rent_range(Range::new(0.0, 200.0));
    let shops = filter.apply(feed());

    let ids: Vec<&str> = shops.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["bj-02", "bj-03"]);

    let index = ClusterIndex::build(shops, IndexConfig::default()).expect("Failed to build index");
    assert_eq!(index.len(), 2);

    let haeundae = ShopFilter::default().with_region("해운대구").apply(feed());
    assert_eq!(haeundae.len(), 2);
}

#[test]
fn test_geojson_export() {
    init_logging();
    let index = ClusterIndex::build(feed(), IndexConfig::default()).expect("Failed to build index");
    let features = index.query(&busan(), 10);

    let collection = features_to_geojson(&features);
    assert_eq!(collection.features.len(), features.len());

    let json = features_to_geojson_string(&features).expect("Failed to serialize");
    let value: serde_json::Value = serde_json::from_str(&json).expect("Valid JSON");
    assert_eq!(value["type"], "FeatureCollection");

    let total: u64 = value["features"]
        .as_array()
        .expect("features array")
        .iter()
        .map(|f| f["properties"]["point_count"].as_u64().unwrap_or(1))
        .sum();
    assert_eq!(total, 5);
}

#[test]
fn test_markers_from_query() {
    init_logging();
    let index = ClusterIndex::build(feed(), IndexConfig::default()).expect("Failed to build index");
    let features = index.query(&busan(), 18);
    let state = MapState::new(Viewport::new(busan(), 18));

    let markers = materialize(&features, &state, &MarkerPolicy::default());
    assert_eq!(markers.len(), 5);
    assert!(markers.iter().all(|m| !m.is_cluster()));

    let capped = materialize(&features, &state, &MarkerPolicy::default().with_max_markers(2));
    let ids: Vec<String> = capped.iter().map(Marker::target_id).collect();
    assert_eq!(ids, vec!["hd-01", "hd-02"]);
}

#[test]
fn test_concurrent_readers_during_reload() {
    init_logging();
    let shared = SharedIndex::new(
        ClusterIndex::build(feed(), IndexConfig::default()).expect("Failed to build index"),
    );

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let shared = shared.clone();
            thread::spawn(move || {
                for zoom in 0..=18 {
                    let index = shared.current();
                    let total: usize = index
                        .query(&busan(), zoom)
                        .iter()
                        .map(Feature::point_count)
                        .sum();
                    // Either the old five shops or the new two, never a mix.
                    assert!(total == 5 || total == 2, "saw {total} shops");
                }
            })
        })
        .collect();

    let smaller = feed().into_iter().filter(|s| s.id.starts_with("hd"));
    shared
        .rebuild(smaller, IndexConfig::default())
        .expect("Failed to rebuild");

    for reader in readers {
        reader.join().expect("reader panicked");
    }
    assert_eq!(shared.current().len(), 2);
}
