pub mod create;
pub mod list;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::groups::requests::CreateGroupRequest;
use crate::runtime::pending::PendingOperations;
use crate::storage::Storage;

pub struct GroupService {
    storage: Option<Arc<dyn Storage>>,
}

impl GroupService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from(request),
        }
    }

    pub(crate) fn get_pending(&self, request: &HttpRequest) -> ActixResult<PendingOperations> {
        super::pending_from(request)
    }

    // 小组列表
    pub async fn list_groups(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        list::list_groups(self, request).await
    }

    // 创建小组
    pub async fn create_group(
        &self,
        group_data: CreateGroupRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_group(self, group_data, request).await
    }
}
