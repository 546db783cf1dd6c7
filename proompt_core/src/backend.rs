use std::future::Future;

use serde::Deserialize;
use serde::Serialize;

use crate::ProomptResult;
use crate::ResolutionResult;
use crate::ValueMap;
use crate::VariableDescriptor;
use crate::VariableStatus;
use crate::resolve_template;

/// Body of a preview request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewRequest {
	pub content: String,
	#[serde(default)]
	pub variables: ValueMap,
}

/// A variable as it appears in a preview response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateVariable {
	pub name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub default_value: Option<String>,
	pub has_default: bool,
	pub status: VariableStatus,
}

/// Body of a preview response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewResponse {
	pub resolved_content: String,
	#[serde(default)]
	pub variables: Vec<TemplateVariable>,
	#[serde(default)]
	pub warnings: Vec<String>,
	#[serde(default)]
	pub snippets: Vec<String>,
}

impl From<VariableDescriptor> for TemplateVariable {
	fn from(variable: VariableDescriptor) -> Self {
		Self {
			has_default: variable.has_default(),
			name: variable.name,
			default_value: variable.default_value,
			status: variable.status,
		}
	}
}

impl From<TemplateVariable> for VariableDescriptor {
	fn from(variable: TemplateVariable) -> Self {
		// A backend may send `has_default: true` with an empty default
		// omitted from the payload.
		let default_value = match variable.default_value {
			Some(value) => Some(value),
			None if variable.has_default => Some(String::new()),
			None => None,
		};

		Self {
			name: variable.name,
			default_value,
			status: variable.status,
		}
	}
}

impl From<ResolutionResult> for PreviewResponse {
	fn from(result: ResolutionResult) -> Self {
		Self {
			resolved_content: result.resolved_text,
			variables: result.variables.into_iter().map(Into::into).collect(),
			warnings: result.warnings,
			snippets: result.snippets,
		}
	}
}

impl From<PreviewResponse> for ResolutionResult {
	fn from(response: PreviewResponse) -> Self {
		Self {
			resolved_text: response.resolved_content,
			variables: response.variables.into_iter().map(Into::into).collect(),
			warnings: response.warnings,
			snippets: response.snippets,
		}
	}
}

/// Something that can turn a preview request into a preview response. This
/// may be local computation or a remote service; transport timeouts and
/// retries are the backend's own concern.
pub trait PreviewBackend: Send + Sync + 'static {
	fn preview(
		&self,
		request: PreviewRequest,
	) -> impl Future<Output = ProomptResult<PreviewResponse>> + Send;
}

/// Resolve a preview request with the in-process engine.
pub fn resolve_request(request: &PreviewRequest) -> PreviewResponse {
	resolve_template(&request.content, &request.variables).into()
}

/// A backend that resolves in-process without any network hop.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalBackend;

impl PreviewBackend for LocalBackend {
	fn preview(
		&self,
		request: PreviewRequest,
	) -> impl Future<Output = ProomptResult<PreviewResponse>> + Send {
		let response = resolve_request(&request);
		async move { Ok(response) }
	}
}
