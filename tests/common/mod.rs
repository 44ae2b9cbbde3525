#![allow(dead_code)]

use serde_json::json;
use std::cell::RefCell;
use zabbix_template_tools::api::{ConfigFormat, TemplateFilter, TemplateRef, ZabbixApi};
use zabbix_template_tools::import::ImportRules;
use zabbix_template_tools::{Result, TemplateToolError};

pub const EXPORT_DATE: &str = "2021-06-14T08:30:00Z";

/// In-memory stand-in for a Zabbix server.
#[derive(Default)]
pub struct FakeZabbix {
    pub templates: Vec<TemplateRef>,
    pub fail_export_for: Option<String>,
    pub filters: RefCell<Vec<TemplateFilter>>,
    pub exports: RefCell<Vec<(ConfigFormat, Vec<String>)>>,
    pub imports: RefCell<Vec<(ConfigFormat, ImportRules, String)>>,
}

impl FakeZabbix {
    pub fn with_templates(templates: &[(&str, &str, &str)]) -> Self {
        Self {
            templates: templates
                .iter()
                .map(|(id, host, name)| TemplateRef {
                    templateid: id.to_string(),
                    host: host.to_string(),
                    name: name.to_string(),
                })
                .collect(),
            ..Self::default()
        }
    }

    fn template(&self, id: &str) -> Option<&TemplateRef> {
        self.templates.iter().find(|t| t.templateid == id)
    }
}

impl ZabbixApi for FakeZabbix {
    fn get_templates(&self, filter: &TemplateFilter) -> Result<Vec<TemplateRef>> {
        self.filters.borrow_mut().push(filter.clone());
        Ok(self
            .templates
            .iter()
            .filter(|t| match filter {
                TemplateFilter::All => true,
                TemplateFilter::Host(host) => &t.host == host,
                TemplateFilter::VisibleName(name) => &t.name == name,
            })
            .cloned()
            .collect())
    }

    fn export_configuration(&self, format: ConfigFormat, template_ids: &[String]) -> Result<String> {
        self.exports
            .borrow_mut()
            .push((format, template_ids.to_vec()));

        let id = &template_ids[0];
        if self.fail_export_for.as_deref() == Some(id.as_str()) {
            return Err(TemplateToolError::Api {
                code: -32500,
                message: "Application error.".to_string(),
                data: "No permissions to referred object or it does not exist!".to_string(),
            });
        }

        let template = self.template(id).expect("export of unknown template id");
        Ok(match format {
            ConfigFormat::Xml => format!(
                concat!(
                    r#"<?xml version="1.0" encoding="UTF-8"?>"#,
                    "<zabbix_export><version>4.0</version><date>{}</date>",
                    "<templates><template><template>{}</template><name>{}</name>",
                    "</template></templates></zabbix_export>"
                ),
                EXPORT_DATE, template.host, template.name
            ),
            ConfigFormat::Json => json!({
                "zabbix_export": {
                    "version": "4.0",
                    "date": EXPORT_DATE,
                    "templates": [{ "template": template.host, "name": template.name }]
                }
            })
            .to_string(),
        })
    }

    fn import_configuration(
        &self,
        format: ConfigFormat,
        rules: &ImportRules,
        source: &str,
    ) -> Result<()> {
        self.imports
            .borrow_mut()
            .push((format, rules.clone(), source.to_string()));
        Ok(())
    }
}
