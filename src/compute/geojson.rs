//! GeoJSON export of query results.

use crate::compute::cluster::{ClusterFeature, Feature, PointFeature};
use crate::error::Result;
use geojson::feature::Id;
use geojson::{FeatureCollection, Geometry, Value};
use serde_json::{Map, json};

fn point_geometry(x: f64, y: f64) -> Geometry {
    Geometry::new(Value::Point(vec![x, y]))
}

fn cluster_to_feature(cluster: &ClusterFeature) -> geojson::Feature {
    let mut props = Map::new();
    props.insert("cluster".to_string(), json!(true));
    props.insert("cluster_id".to_string(), json!(cluster.id.raw()));
    props.insert("point_count".to_string(), json!(cluster.point_count));
    props.insert(
        "point_count_abbreviated".to_string(),
        json!(cluster.abbreviated_count()),
    );

    geojson::Feature {
        bbox: None,
        geometry: Some(point_geometry(cluster.centroid.x(), cluster.centroid.y())),
        id: Some(Id::String(cluster.id.to_string())),
        properties: Some(props),
        foreign_members: None,
    }
}

fn point_to_feature(point: &PointFeature) -> geojson::Feature {
    let shop = &point.shop;
    let mut props = Map::new();
    props.insert("cluster".to_string(), json!(false));
    props.insert("shop_id".to_string(), json!(shop.id));
    props.insert("name".to_string(), json!(shop.name));
    props.insert("shop_type".to_string(), json!(shop.category.as_str()));
    props.insert("monthly_rent".to_string(), json!(shop.monthly_rent));

    geojson::Feature {
        bbox: None,
        geometry: Some(point_geometry(shop.longitude, shop.latitude)),
        id: Some(Id::String(shop.id.clone())),
        properties: Some(props),
        foreign_members: None,
    }
}

/// Converts a query result to a GeoJSON FeatureCollection.
///
/// Clusters carry `cluster`, `cluster_id`, `point_count` and
/// `point_count_abbreviated`; points carry `shop_id`, `name`, `shop_type`
/// and `monthly_rent`.
pub fn features_to_geojson(features: &[Feature]) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: features
            .iter()
            .map(|feature| match feature {
                Feature::Cluster(cluster) => cluster_to_feature(cluster),
                Feature::Point(point) => point_to_feature(point),
            })
            .collect(),
        foreign_members: None,
    }
}

/// Converts a query result to a GeoJSON string.
pub fn features_to_geojson_string(features: &[Feature]) -> Result<String> {
    Ok(serde_json::to_string(&features_to_geojson(features))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::cluster::ClusterIndex;
    use crate::config::IndexConfig;
    use vacancy_types::{MapBounds, ShopCategory, ShopRecord};

    fn sample() -> (ClusterIndex, MapBounds) {
        let shops = vec![
            ShopRecord::new("a", 35.1578, 129.0590),
            ShopRecord::new("b", 35.1579, 129.0591),
            ShopRecord::new("c", 35.1631, 129.1604)
                .with_name("Haeundae unit")
                .with_category(ShopCategory::Restaurant)
                .with_monthly_rent(250.0),
        ];
        let index = ClusterIndex::build(shops, IndexConfig::default()).unwrap();
        (index, MapBounds::new(128.9, 35.0, 129.3, 35.3))
    }

    #[test]
    fn test_features_to_geojson() {
        let (index, bounds) = sample();
        let features = index.query(&bounds, 13);
        let collection = features_to_geojson(&features);
        assert_eq!(collection.features.len(), 2);

        let cluster = collection
            .features
            .iter()
            .find(|f| f.property("cluster") == Some(&json!(true)))
            .unwrap();
        assert_eq!(cluster.property("point_count"), Some(&json!(2)));
        assert_eq!(cluster.property("point_count_abbreviated"), Some(&json!("2")));

        let point = collection
            .features
            .iter()
            .find(|f| f.property("cluster") == Some(&json!(false)))
            .unwrap();
        assert_eq!(point.property("shop_id"), Some(&json!("c")));
        assert_eq!(point.property("shop_type"), Some(&json!("restaurant")));
        assert_eq!(point.property("monthly_rent"), Some(&json!(250.0)));
    }

    #[test]
    fn test_geojson_string() {
        let (index, bounds) = sample();
        let json = features_to_geojson_string(&index.query(&bounds, 18)).unwrap();
        assert!(json.contains("FeatureCollection"));
        assert!(json.contains("Haeundae unit"));
        assert!(json.contains("129.1604"));
    }

    #[test]
    fn test_empty_result() {
        let collection = features_to_geojson(&[]);
        assert!(collection.features.is_empty());
    }
}
