// src/browser/session.rs

use super::{
    client::{ClientError, PropertyApi},
    filter::PropertyFilter,
};
use crate::models::property::{Property, PropertyPayload};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// Mensagem curta para o usuário (o "toast" da tela).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}

fn describe(action: &str, err: &ClientError) -> String {
    match err {
        ClientError::Unauthenticated => "Сессия истекла. Войдите снова.".to_string(),
        e if e.is_conflict() => {
            "Объект уже изменён другим пользователем. Обновите список.".to_string()
        }
        ClientError::Status { message, .. } => format!("{}: {}", action, message),
        ClientError::Http(_) => format!("{}: сервер недоступен", action),
    }
}

/// Estado da tela de imóveis: a lista carregada, o filtro atual e os
/// avisos pendentes. A lista local só muda depois que o servidor confirma.
pub struct PropertyBrowser<A: PropertyApi> {
    api: A,
    properties: Vec<Property>,
    filter: PropertyFilter,
    notices: Vec<Notice>,
}

impl<A: PropertyApi> PropertyBrowser<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            properties: Vec::new(),
            filter: PropertyFilter::default(),
            notices: Vec::new(),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn api_mut(&mut self) -> &mut A {
        &mut self.api
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn visible(&self) -> Vec<&Property> {
        self.filter.apply(&self.properties)
    }

    pub fn filter(&self) -> &PropertyFilter {
        &self.filter
    }

    pub fn filter_mut(&mut self) -> &mut PropertyFilter {
        &mut self.filter
    }

    pub fn set_filter(&mut self, filter: PropertyFilter) {
        self.filter = filter;
    }

    pub fn reset_filter(&mut self) {
        self.filter = PropertyFilter::default();
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn fail(&mut self, action: &str, err: ClientError) -> ClientError {
        tracing::warn!("⚠️ {}: {}", action, err);
        self.notices.push(Notice::error(describe(action, &err)));
        err
    }

    fn replace_local(&mut self, property: Property) {
        match self.properties.iter_mut().find(|p| p.id == property.id) {
            Some(slot) => *slot = property,
            None => self.properties.push(property),
        }
    }

    pub async fn load(&mut self) -> Result<(), ClientError> {
        match self.api.list_properties().await {
            Ok(properties) => {
                self.properties = properties;
                Ok(())
            }
            Err(e) => Err(self.fail("Ошибка загрузки объектов", e)),
        }
    }

    pub async fn create(&mut self, payload: &PropertyPayload) -> Result<Property, ClientError> {
        match self.api.create_property(payload).await {
            Ok(property) => {
                self.properties.push(property.clone());
                self.notices.push(Notice::success("Объект успешно добавлен"));
                Ok(property)
            }
            Err(e) => Err(self.fail("Не удалось добавить объект", e)),
        }
    }

    /// Envia a versão que temos em memória; se o servidor já tiver outra, volta 409.
    pub async fn update(
        &mut self,
        id: &str,
        payload: &PropertyPayload,
    ) -> Result<Property, ClientError> {
        let expected = self
            .properties
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.version);

        match self.api.update_property(id, payload, expected).await {
            Ok(property) => {
                self.replace_local(property.clone());
                self.notices.push(Notice::success("Объект успешно обновлён"));
                Ok(property)
            }
            Err(e) => Err(self.fail("Не удалось обновить объект", e)),
        }
    }

    pub async fn delete(&mut self, id: &str) -> Result<(), ClientError> {
        match self.api.delete_property(id).await {
            Ok(()) => {
                self.properties.retain(|p| p.id != id);
                self.notices.push(Notice::success("Объект удалён"));
                Ok(())
            }
            Err(e) => Err(self.fail("Не удалось удалить объект", e)),
        }
    }

    pub async fn publish(&mut self, id: &str) -> Result<String, ClientError> {
        match self.api.publish_property(id).await {
            Ok(property) => {
                let link = property.details.public_link.clone().unwrap_or_default();
                self.replace_local(property);
                self.notices.push(Notice::success("Ссылка сохранена"));
                Ok(link)
            }
            Err(e) => Err(self.fail("Не удалось сгенерировать ссылку", e)),
        }
    }
}
