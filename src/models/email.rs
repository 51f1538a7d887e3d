use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::AdapterError;

/// Provider-side template; the provider renders it with `data`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TemplateRef {
    pub id: String,
    #[serde(default)]
    pub data: Map<String, Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EmailRequest {
    pub to: String,
    pub from: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default, alias = "body")]
    pub text: Option<String>,
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default)]
    pub correlation_id: Option<String>,
    #[serde(default)]
    pub template: Option<TemplateRef>,
}

impl EmailRequest {
    pub fn new(
        to: impl Into<String>,
        from: impl Into<String>,
        subject: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            to: to.into(),
            from: from.into(),
            subject: subject.into(),
            text: Some(text.into()),
            html: None,
            correlation_id: None,
            template: None,
        }
    }

    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    pub fn with_template(mut self, template: TemplateRef) -> Self {
        self.template = Some(template);
        self
    }

    pub fn validate(&self) -> Result<(), AdapterError> {
        if self.to.trim().is_empty() {
            return Err(AdapterError::MalformedRequest("recipient is empty".into()));
        }
        if self.from.trim().is_empty() {
            return Err(AdapterError::MalformedRequest("sender is empty".into()));
        }

        let has_body = [&self.text, &self.html]
            .iter()
            .any(|part| part.as_deref().is_some_and(|s| !s.trim().is_empty()));

        match &self.template {
            Some(template) if template.id.trim().is_empty() => Err(
                AdapterError::MalformedRequest("template id is empty".into()),
            ),
            Some(_) => Ok(()),
            None if self.subject.trim().is_empty() => {
                Err(AdapterError::MalformedRequest("subject is empty".into()))
            }
            None if !has_body => Err(AdapterError::MalformedRequest(
                "email needs a text or html body".into(),
            )),
            None => Ok(()),
        }
    }
}
