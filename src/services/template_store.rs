//! 模板存储 - 业务能力层
//!
//! 所有模板以 JSON 数组的形式保存在同一个文件中，
//! 启动时加载一次，每次修改后整体重写

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{AppResult, StorageError};
use crate::models::rubric::Criterion;
use crate::models::template::Template;

/// 模板存储
pub struct TemplateStore {
    path: PathBuf,
    templates: Vec<Template>,
}

impl TemplateStore {
    /// 加载模板文件
    ///
    /// 文件不存在时返回空列表；内容损坏时记录警告并返回空列表
    pub fn load(path: impl Into<PathBuf>) -> AppResult<Self> {
        let path = path.into();

        let templates = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|source| StorageError::ReadFailed {
                path: path.display().to_string(),
                source,
            })?;
            match serde_json::from_str::<Vec<Template>>(&content) {
                Ok(templates) => templates,
                Err(e) => {
                    warn!("⚠️ 模板文件损坏，已忽略 ({}): {}", path.display(), e);
                    Vec::new()
                }
            }
        } else {
            debug!("模板文件不存在，使用空列表: {}", path.display());
            Vec::new()
        };

        info!("📁 已加载 {} 个模板", templates.len());

        Ok(Self { path, templates })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn list(&self) -> &[Template] {
        &self.templates
    }

    pub fn get(&self, id: &str) -> Option<&Template> {
        self.templates.iter().find(|t| t.id == id)
    }

    /// 按名称查找（同名时取最新的）
    pub fn find_by_name(&self, name: &str) -> Option<&Template> {
        self.templates
            .iter()
            .filter(|t| t.name == name)
            .max_by_key(|t| t.created_at)
    }

    /// 保存新模板
    pub fn save(
        &mut self,
        name: impl Into<String>,
        tasks: Vec<String>,
        criteria: Vec<Criterion>,
    ) -> AppResult<&Template> {
        let template = Template::new(name, tasks, criteria);
        info!("💾 保存模板: {} ({})", template.name, template.id);
        self.templates.push(template);
        self.persist()?;
        let last = self.templates.len() - 1;
        Ok(&self.templates[last])
    }

    pub fn rename(&mut self, id: &str, name: impl Into<String>) -> AppResult<()> {
        let template = self
            .templates
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| StorageError::TemplateNotFound { id: id.to_string() })?;
        template.name = name.into();
        self.persist()
    }

    pub fn delete(&mut self, id: &str) -> AppResult<Template> {
        let pos = self
            .templates
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| StorageError::TemplateNotFound { id: id.to_string() })?;
        let removed = self.templates.remove(pos);
        info!("🗑️ 删除模板: {}", removed.name);
        self.persist()?;
        Ok(removed)
    }

    fn persist(&self) -> AppResult<()> {
        let content = serde_json::to_string_pretty(&self.templates)?;
        fs::write(&self.path, content).map_err(|source| StorageError::WriteFailed {
            path: self.path.display().to_string(),
            source,
        })?;
        debug!("模板文件已写入: {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = TemplateStore::load(dir.path().join("none.json")).unwrap();
        assert!(store.list().is_empty());
    }

    #[test]
    fn test_corrupt_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("templates.json");
        fs::write(&path, "{not json").unwrap();
        let store = TemplateStore::load(&path).unwrap();
        assert!(store.list().is_empty());
    }

    #[test]
    fn test_save_reload_rename_delete() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("templates.json");

        let id = {
            let mut store = TemplateStore::load(&path).unwrap();
            let t = store
                .save("作文", vec!["写作".to_string()], vec![Criterion::new("立意")])
                .unwrap();
            t.id.clone()
        };

        let mut store = TemplateStore::load(&path).unwrap();
        assert_eq!(store.list().len(), 1);
        assert_eq!(store.get(&id).unwrap().criteria[0].focus, "立意");
        assert!(store.find_by_name("作文").is_some());

        store.rename(&id, "议论文").unwrap();
        let store2 = TemplateStore::load(&path).unwrap();
        assert_eq!(store2.get(&id).unwrap().name, "议论文");

        let removed = store.delete(&id).unwrap();
        assert_eq!(removed.name, "议论文");
        assert!(store.delete(&id).is_err());
        assert!(TemplateStore::load(&path).unwrap().list().is_empty());
    }
}
