use dashmap::DashMap;
use tracing::info;
use uuid::Uuid;

use crate::core::catalog::QueryCatalog;
use crate::error::AppError;
use crate::models::filter::FilterState;
use crate::models::session::DashboardSession;

/// 会话注册表。过滤状态由这里持有，合成器每次只拿到一份快照。
pub struct SessionRegistry {
    catalog: QueryCatalog,
    sessions: DashMap<Uuid, DashboardSession>,
}

impl SessionRegistry {
    pub fn new(catalog: QueryCatalog) -> Self {
        Self {
            catalog,
            sessions: DashMap::new(),
        }
    }

    pub fn create(&self) -> (Uuid, DashboardSession) {
        let id = Uuid::new_v4();
        let session = DashboardSession {
            filters: FilterState::default(),
            selected_title: self.catalog.detail_title().to_string(),
        };
        self.sessions.insert(id, session.clone());
        info!("新建仪表盘会话: id={}", id);
        (id, session)
    }

    pub fn get(&self, id: Uuid) -> Result<DashboardSession, AppError> {
        self.sessions
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or(AppError::SessionNotFound(id))
    }

    pub fn remove(&self, id: Uuid) -> Result<(), AppError> {
        self.sessions
            .remove(&id)
            .map(|_| ())
            .ok_or(AppError::SessionNotFound(id))
    }

    /// 整体替换过滤条件，先校验
    pub fn replace_filters(
        &self,
        id: Uuid,
        filters: FilterState,
    ) -> Result<DashboardSession, AppError> {
        let filters = filters.normalized()?;
        let mut entry = self
            .sessions
            .get_mut(&id)
            .ok_or(AppError::SessionNotFound(id))?;
        entry.filters = filters;
        Ok(entry.value().clone())
    }

    pub fn reset_filters(&self, id: Uuid) -> Result<DashboardSession, AppError> {
        let mut entry = self
            .sessions
            .get_mut(&id)
            .ok_or(AppError::SessionNotFound(id))?;
        entry.filters = FilterState::default();
        Ok(entry.value().clone())
    }

    pub fn select(&self, id: Uuid, title: &str) -> Result<DashboardSession, AppError> {
        if !self.catalog.contains(title) {
            return Err(AppError::UnknownTitle(title.to_string()));
        }
        let mut entry = self
            .sessions
            .get_mut(&id)
            .ok_or(AppError::SessionNotFound(id))?;
        entry.selected_title = title.to_string();
        Ok(entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::filter::{HazardFlag, RangeFilter};

    fn registry() -> SessionRegistry {
        SessionRegistry::new(QueryCatalog)
    }

    #[test]
    fn new_session_selects_detail_query() {
        let registry = registry();
        let (id, session) = registry.create();
        assert_eq!(session.selected_title, QueryCatalog.detail_title());
        assert_eq!(session.filters, FilterState::default());
        assert_eq!(registry.get(id).unwrap(), session);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn replace_filters_validates_first() {
        let registry = registry();
        let (id, _) = registry.create();
        let bad = FilterState {
            velocity_range: RangeFilter::new(50_000.0, 10_000.0),
            ..Default::default()
        };
        assert!(matches!(
            registry.replace_filters(id, bad),
            Err(AppError::InvalidFilter(_))
        ));
        assert_eq!(registry.get(id).unwrap().filters, FilterState::default());

        let good = FilterState {
            hazard_flag: HazardFlag::HazardousOnly,
            ..Default::default()
        };
        let session = registry.replace_filters(id, good).unwrap();
        assert_eq!(session.filters.hazard_flag, HazardFlag::HazardousOnly);
    }

    #[test]
    fn reset_restores_defaults() {
        let registry = registry();
        let (id, _) = registry.create();
        registry
            .replace_filters(
                id,
                FilterState {
                    name_substring: Some("Eros".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        let session = registry.reset_filters(id).unwrap();
        assert_eq!(session.filters, FilterState::default());
    }

    #[test]
    fn select_rejects_unknown_title() {
        let registry = registry();
        let (id, _) = registry.create();
        assert!(matches!(
            registry.select(id, "nope"),
            Err(AppError::UnknownTitle(_))
        ));
        let title = "7. Sort asteroids by maximum estimated diameter (descending)";
        assert_eq!(registry.select(id, title).unwrap().selected_title, title);
    }

    #[test]
    fn missing_session_is_reported() {
        let registry = registry();
        let id = Uuid::new_v4();
        assert!(matches!(registry.get(id), Err(AppError::SessionNotFound(_))));
        assert!(matches!(registry.remove(id), Err(AppError::SessionNotFound(_))));
    }

    #[test]
    fn remove_drops_session() {
        let registry = registry();
        let (id, _) = registry.create();
        registry.remove(id).unwrap();
        assert!(registry.get(id).is_err());
    }
}
