//! 지리 위치 핸들러
//!
//! 멤버 이름은 원본 문자열로 저장합니다 (JSON 직렬화 없음).

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::RedisHandler;
use crate::caching::handler_type::HandlerType;
use crate::caching::template::RedisTemplate;
use crate::core::errors::AppResult;

/// 거리 단위
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeoUnit {
    Meters,
    Kilometers,
    Miles,
    Feet,
}

impl GeoUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeoUnit::Meters => "m",
            GeoUnit::Kilometers => "km",
            GeoUnit::Miles => "mi",
            GeoUnit::Feet => "ft",
        }
    }
}

/// 경도/위도 좌표
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

pub struct GeoHandler {
    template: Arc<RedisTemplate>,
}

impl GeoHandler {
    pub fn new(template: Arc<RedisTemplate>) -> Self {
        Self { template }
    }

    /// 위치를 추가하고 새로 추가된 개수를 반환합니다.
    pub async fn add(&self, key: &str, point: GeoPoint, member: &str) -> AppResult<i64> {
        let mut conn = self.template.connection().await?;
        Ok(redis::cmd("GEOADD")
            .arg(key)
            .arg(point.longitude)
            .arg(point.latitude)
            .arg(member)
            .query_async(&mut conn)
            .await?)
    }

    /// 두 멤버 사이의 거리. 둘 중 하나라도 없으면 `None`.
    pub async fn distance(&self, key: &str, member1: &str, member2: &str, unit: GeoUnit) -> AppResult<Option<f64>> {
        let mut conn = self.template.connection().await?;
        Ok(redis::cmd("GEODIST")
            .arg(key)
            .arg(member1)
            .arg(member2)
            .arg(unit.as_str())
            .query_async(&mut conn)
            .await?)
    }

    pub async fn position(&self, key: &str, members: &[&str]) -> AppResult<Vec<Option<GeoPoint>>> {
        if members.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.template.connection().await?;
        let raw: Vec<Option<(f64, f64)>> = redis::cmd("GEOPOS")
            .arg(key)
            .arg(members)
            .query_async(&mut conn)
            .await?;
        Ok(raw
            .into_iter()
            .map(|p| p.map(|(longitude, latitude)| GeoPoint { longitude, latitude }))
            .collect())
    }

    /// 기준 멤버로부터 반경 안에 있는 멤버 이름 목록 (`GEOSEARCH ... FROMMEMBER`)
    pub async fn radius_by_member(&self, key: &str, member: &str, radius: f64, unit: GeoUnit) -> AppResult<Vec<String>> {
        let mut conn = self.template.connection().await?;
        Ok(redis::cmd("GEOSEARCH")
            .arg(key)
            .arg("FROMMEMBER")
            .arg(member)
            .arg("BYRADIUS")
            .arg(radius)
            .arg(unit.as_str())
            .arg("ASC")
            .query_async(&mut conn)
            .await?)
    }

    /// 멤버를 제거합니다. 지리 인덱스는 정렬 집합이므로 `ZREM`을 사용합니다.
    pub async fn remove(&self, key: &str, members: &[&str]) -> AppResult<i64> {
        if members.is_empty() {
            return Ok(0);
        }
        let mut conn = self.template.connection().await?;
        Ok(redis::cmd("ZREM").arg(key).arg(members).query_async(&mut conn).await?)
    }
}

impl RedisHandler for GeoHandler {
    fn handler_type(&self) -> HandlerType {
        HandlerType::Geo
    }

    fn redis_template(&self) -> &Arc<RedisTemplate> {
        &self.template
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_arguments() {
        assert_eq!(GeoUnit::Meters.as_str(), "m");
        assert_eq!(GeoUnit::Kilometers.as_str(), "km");
        assert_eq!(GeoUnit::Miles.as_str(), "mi");
        assert_eq!(GeoUnit::Feet.as_str(), "ft");
    }
}
