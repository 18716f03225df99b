// src/db/file_repo.rs

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tokio::{io::AsyncWriteExt, sync::RwLock};

use crate::{
    common::error::AppError,
    db::repository::{CustomOptionsRepository, PropertyRepository},
    models::{
        custom_options::CustomOptions,
        property::{Property, PropertyDetails},
    },
};

// O documento inteiro, como fica no disco.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "StoredDocument")]
struct Document {
    properties: Vec<Property>,

    // Registros que não conseguimos ler: ficam fora da API, mas voltam
    // intactos para o arquivo em toda gravação.
    unreadable: Vec<Value>,

    custom_options: Option<CustomOptions>,

    // Outras coleções que porventura existam no arquivo são preservadas.
    other: Map<String, Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredDocument {
    #[serde(default)]
    properties: Vec<Value>,

    #[serde(default, deserialize_with = "latest_snapshot")]
    custom_options: Option<CustomOptions>,

    #[serde(flatten)]
    other: Map<String, Value>,
}

impl From<StoredDocument> for Document {
    fn from(stored: StoredDocument) -> Self {
        let mut properties = Vec::with_capacity(stored.properties.len());
        let mut unreadable = Vec::new();

        for raw in stored.properties {
            match serde_json::from_value::<Property>(raw.clone()) {
                Ok(property) => properties.push(property),
                Err(e) => {
                    let id = raw.get("id").cloned().unwrap_or(Value::Null);
                    tracing::warn!("⚠️ Imóvel {} ignorado, registro inválido: {}", id, e);
                    unreadable.push(raw);
                }
            }
        }

        Self {
            properties,
            unreadable,
            custom_options: stored.custom_options,
            other: stored.other,
        }
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum StoredRecord<'a> {
    Readable(&'a Property),
    Unreadable(&'a Value),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DocumentOut<'a> {
    properties: Vec<StoredRecord<'a>>,
    custom_options: &'a Option<CustomOptions>,
    #[serde(flatten)]
    other: &'a Map<String, Value>,
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let properties = self
            .properties
            .iter()
            .map(StoredRecord::Readable)
            .chain(self.unreadable.iter().map(StoredRecord::Unreadable))
            .collect();

        DocumentOut {
            properties,
            custom_options: &self.custom_options,
            other: &self.other,
        }
        .serialize(serializer)
    }
}

// Versões antigas gravavam um histórico de snapshots; vale o último.
fn latest_snapshot<'de, D>(deserializer: D) -> Result<Option<CustomOptions>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Stored {
        Many(Vec<CustomOptions>),
        One(CustomOptions),
    }

    Ok(match Option::<Stored>::deserialize(deserializer)? {
        Some(Stored::Many(snapshots)) => snapshots.into_iter().last(),
        Some(Stored::One(options)) => Some(options),
        None => None,
    })
}

/// Backend em arquivo JSON. O documento todo vive em memória atrás de um
/// `RwLock`; cada escrita segura o lock exclusivo durante o ciclo
/// ler-modificar-gravar e só troca o estado em memória depois do flush.
pub struct JsonFileRepository {
    path: PathBuf,
    document: RwLock<Document>,
}

impl JsonFileRepository {
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let path = path.into();

        // Só um arquivo ausente ou vazio é gravado aqui; um arquivo existente
        // fica byte a byte como está até a primeira escrita de verdade.
        let (document, fresh) = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => (Document::default(), true),
            Ok(bytes) => (serde_json::from_slice(&bytes)?, false),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!("⚠️ {} não existe, criando um banco vazio.", path.display());
                (Document::default(), true)
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let repo = Self {
            path,
            document: RwLock::new(document),
        };
        {
            let document = repo.document.read().await;
            if fresh {
                repo.flush(&document).await?;
            }
            tracing::info!(
                "✅ Banco em arquivo carregado: {} ({} imóveis)",
                repo.path.display(),
                document.properties.len()
            );
            if !document.unreadable.is_empty() {
                tracing::warn!(
                    "⚠️ {} registro(s) ilegível(is) mantido(s) no arquivo sem alteração",
                    document.unreadable.len()
                );
            }
        }
        Ok(repo)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // Grava num arquivo temporário e renomeia por cima: ou o arquivo antigo
    // continua inteiro, ou o novo já está inteiro no disco.
    async fn flush(&self, document: &Document) -> Result<(), AppError> {
        let bytes = serde_json::to_vec_pretty(document)?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(&bytes).await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    async fn mutate<T>(
        &self,
        change: impl FnOnce(&mut Document) -> Result<T, AppError>,
    ) -> Result<T, AppError> {
        let mut current = self.document.write().await;
        let mut next = current.clone();
        let out = change(&mut next)?;

        if next != *current {
            self.flush(&next).await?;
            *current = next;
        }
        Ok(out)
    }
}

#[async_trait]
impl PropertyRepository for JsonFileRepository {
    async fn list(&self) -> Result<Vec<Property>, AppError> {
        let mut properties = self.document.read().await.properties.clone();
        properties.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(properties)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Property>, AppError> {
        let document = self.document.read().await;
        Ok(document.properties.iter().find(|p| p.id == id).cloned())
    }

    async fn insert(&self, property: Property) -> Result<Property, AppError> {
        self.mutate(|doc| {
            if doc.properties.iter().any(|p| p.id == property.id) {
                return Err(anyhow::anyhow!("id duplicado: {}", property.id).into());
            }
            doc.properties.push(property.clone());
            Ok(property)
        })
        .await
    }

    async fn replace(
        &self,
        id: &str,
        details: PropertyDetails,
        expected_version: Option<i32>,
    ) -> Result<Property, AppError> {
        self.mutate(|doc| {
            let property = doc
                .properties
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or(AppError::PropertyNotFound)?;

            if let Some(expected) = expected_version {
                if property.version != expected {
                    return Err(AppError::VersionConflict {
                        expected,
                        actual: property.version,
                    });
                }
            }

            property.replace_details(details);
            Ok(property.clone())
        })
        .await
    }

    async fn delete(&self, id: &str) -> Result<bool, AppError> {
        self.mutate(|doc| {
            let before = doc.properties.len();
            doc.properties.retain(|p| p.id != id);
            Ok(doc.properties.len() != before)
        })
        .await
    }

    async fn set_public_link_if_absent(
        &self,
        id: &str,
        link: &str,
    ) -> Result<Option<Property>, AppError> {
        self.mutate(|doc| {
            let Some(property) = doc.properties.iter_mut().find(|p| p.id == id) else {
                return Ok(None);
            };
            if property.details.public_link.is_none() {
                property.details.public_link = Some(link.to_string());
                property.touch();
            }
            Ok(Some(property.clone()))
        })
        .await
    }
}

#[async_trait]
impl CustomOptionsRepository for JsonFileRepository {
    async fn get(&self) -> Result<Option<CustomOptions>, AppError> {
        Ok(self.document.read().await.custom_options.clone())
    }

    async fn replace(&self, mut options: CustomOptions) -> Result<CustomOptions, AppError> {
        options.updated_at = Some(Utc::now());
        self.mutate(|doc| {
            doc.custom_options = Some(options.clone());
            Ok(options)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::property::PropertyCategory;
    use chrono::Duration;
    use serde_json::json;

    fn details(district: &str) -> PropertyDetails {
        serde_json::from_value(json!({
            "category": "apartments",
            "price": 42000,
            "district": district,
            "address": "ул. Дерибасовская 5",
            "ownerPhone": "+380931234567",
            "totalArea": 45.5,
            "tech": ["Кондиционер"]
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn missing_file_is_created_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("db.json");

        let repo = JsonFileRepository::open(&path).await.unwrap();
        assert!(PropertyRepository::list(&repo).await.unwrap().is_empty());
        assert!(path.exists());
    }

    #[tokio::test]
    async fn writes_survive_a_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");

        let repo = JsonFileRepository::open(&path).await.unwrap();
        let saved = repo.insert(Property::new(details("Приморский"))).await.unwrap();
        drop(repo);

        let reopened = JsonFileRepository::open(&path).await.unwrap();
        let found = reopened.find_by_id(&saved.id).await.unwrap().unwrap();
        assert_eq!(found, saved);
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonFileRepository::open(dir.path().join("db.json")).await.unwrap();

        let mut older = Property::new(details("Киевский"));
        older.created_at = older.created_at - Duration::hours(1);
        let older = repo.insert(older).await.unwrap();
        let newer = repo.insert(Property::new(details("Малиновский"))).await.unwrap();

        let ids: Vec<String> = PropertyRepository::list(&repo)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![newer.id, older.id]);
    }

    #[tokio::test]
    async fn replace_checks_the_version() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonFileRepository::open(dir.path().join("db.json")).await.unwrap();
        let saved = repo.insert(Property::new(details("Приморский"))).await.unwrap();

        let updated = PropertyRepository::replace(&repo, &saved.id, details("Суворовский"), Some(1))
            .await
            .unwrap();
        assert_eq!(updated.version, 2);
        assert_eq!(updated.created_at, saved.created_at);

        let stale = PropertyRepository::replace(&repo, &saved.id, details("Киевский"), Some(1)).await;
        assert!(matches!(
            stale,
            Err(AppError::VersionConflict { expected: 1, actual: 2 })
        ));

        let missing = PropertyRepository::replace(&repo, "nope", details("Киевский"), None).await;
        assert!(matches!(missing, Err(AppError::PropertyNotFound)));
    }

    #[tokio::test]
    async fn delete_reports_unknown_ids() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonFileRepository::open(dir.path().join("db.json")).await.unwrap();
        let saved = repo.insert(Property::new(details("Приморский"))).await.unwrap();

        assert!(repo.delete(&saved.id).await.unwrap());
        assert!(!repo.delete(&saved.id).await.unwrap());
        assert!(repo.find_by_id(&saved.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn public_link_is_only_set_once() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonFileRepository::open(dir.path().join("db.json")).await.unwrap();
        let saved = repo.insert(Property::new(details("Приморский"))).await.unwrap();

        let first = repo
            .set_public_link_if_absent(&saved.id, "http://crm/property/1")
            .await
            .unwrap()
            .unwrap();
        let second = repo
            .set_public_link_if_absent(&saved.id, "http://crm/property/other")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(first.details.public_link.as_deref(), Some("http://crm/property/1"));
        assert_eq!(second, first);
        assert!(repo.set_public_link_if_absent("nope", "x").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn legacy_snapshot_history_collapses_to_latest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        let legacy = json!({
            "properties": [{
                "id": "1718000000000",
                "category": "houses",
                "type": "New Build",
                "price": 150000,
                "district": "Приморский",
                "address": "ул. Ленина 1",
                "ownerPhone": "+380501234567",
                "totalArea": 120
            }],
            "customOptions": [
                { "districts": ["Старый"] },
                { "districts": ["Аркадия"], "techOptions": ["Бойлер"] }
            ],
            "users": [{ "id": 1 }]
        });
        std::fs::write(&path, serde_json::to_vec(&legacy).unwrap()).unwrap();

        let repo = JsonFileRepository::open(&path).await.unwrap();
        let options = CustomOptionsRepository::get(&repo).await.unwrap().unwrap();
        assert_eq!(options.districts, vec!["Аркадия".to_string()]);

        let property = repo.find_by_id("1718000000000").await.unwrap().unwrap();
        assert_eq!(property.details.category, PropertyCategory::Houses);

        // A coleção desconhecida continua no arquivo regravado.
        CustomOptionsRepository::replace(&repo, options).await.unwrap();
        let on_disk: Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(on_disk["users"][0]["id"], 1);
        assert!(on_disk["customOptions"].is_object());
    }

    #[tokio::test]
    async fn custom_options_are_replaced_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonFileRepository::open(dir.path().join("db.json")).await.unwrap();
        assert!(CustomOptionsRepository::get(&repo).await.unwrap().is_none());

        let first = CustomOptions {
            districts: vec!["Аркадия".into()],
            ..Default::default()
        };
        let second = CustomOptions {
            heating_options: vec!["Газ".into()],
            ..Default::default()
        };
        CustomOptionsRepository::replace(&repo, first).await.unwrap();
        let saved = CustomOptionsRepository::replace(&repo, second).await.unwrap();
        assert!(saved.updated_at.is_some());

        let current = CustomOptionsRepository::get(&repo).await.unwrap().unwrap();
        assert!(current.districts.is_empty());
        assert_eq!(current.heating_options, vec!["Газ".to_string()]);
    }

    #[tokio::test]
    async fn opening_an_existing_file_does_not_rewrite_it() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        let legacy = br#"{"properties":[{"id":"1","category":"land","price":9000,"district":"Kyivskyi","address":"A","ownerPhone":"B","totalArea":1}]}"#;
        std::fs::write(&path, legacy).unwrap();

        let repo = JsonFileRepository::open(&path).await.unwrap();
        assert_eq!(PropertyRepository::list(&repo).await.unwrap().len(), 1);
        drop(repo);

        assert_eq!(std::fs::read(&path).unwrap(), legacy.to_vec());
    }

    #[tokio::test]
    async fn unreadable_records_are_skipped_but_kept_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        let legacy = json!({
            "properties": [
                {
                    "id": "ok",
                    "category": "apartments",
                    "price": 30000,
                    "district": "Приморский",
                    "address": "ул. Пушкинская 1",
                    "ownerPhone": "+380",
                    "totalArea": 30
                },
                { "id": "broken", "category": "apartments", "price": 1 }
            ]
        });
        std::fs::write(&path, serde_json::to_vec(&legacy).unwrap()).unwrap();

        let repo = JsonFileRepository::open(&path).await.unwrap();
        let ids: Vec<String> = PropertyRepository::list(&repo)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec!["ok".to_string()]);

        // Uma escrita qualquer regrava o arquivo; o registro ilegível continua lá.
        repo.insert(Property::new(details("Аркадия"))).await.unwrap();
        let on_disk: Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        let stored = on_disk["properties"].as_array().unwrap();
        assert_eq!(stored.len(), 3);
        assert!(stored.iter().any(|p| p == &legacy["properties"][1]));
    }
}
