//! Scenario fixture data
//!
//! A scenario holds everything the workflow sends that is not discovered
//! from the backend: addresses, return reasons, manager notes. The built-in
//! default reproduces a defective-screen refund to the wallet; a YAML file
//! can override any part of it.

use serde::Deserialize;
use std::path::Path;

use crate::api::types::{RefundMethod, ReturnReason};
use crate::common::{Error, Result};

/// A complete scenario, as loaded from YAML or built in
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Scenario {
    /// Name shown in the run banner
    pub name: String,
    /// Optional description of what the scenario exercises
    pub description: Option<String>,
    /// How the order to return is chosen or created
    pub order: OrderFixture,
    /// The return the client requests
    pub return_request: ReturnFixture,
    /// The manager's approval
    pub approval: ApprovalFixture,
    /// Second return that the manager rejects
    pub rejection: RejectionFixture,
    /// Audit log query
    pub audit: AuditFixture,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            name: "Returns and warranties full flow".to_string(),
            description: Some(
                "Request, evaluate and approve a return, then verify the wallet refund"
                    .to_string(),
            ),
            order: OrderFixture::default(),
            return_request: ReturnFixture::default(),
            approval: ApprovalFixture::default(),
            rejection: RejectionFixture::default(),
            audit: AuditFixture::default(),
        }
    }
}

/// Order selection and creation
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct OrderFixture {
    pub shipping_address: String,
    pub payment_method: String,
    pub quantity: u32,
    /// Always create a new order instead of reusing a PAID/DELIVERED one
    pub fresh: bool,
}

impl Default for OrderFixture {
    fn default() -> Self {
        Self {
            shipping_address: "Calle Principal 123, La Paz, Bolivia".to_string(),
            payment_method: "CARD".to_string(),
            quantity: 1,
            fresh: false,
        }
    }
}

/// The return request the client files
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ReturnFixture {
    pub reason: ReturnReason,
    pub description: String,
    pub refund_method: RefundMethod,
    pub quantity: u32,
}

impl Default for ReturnFixture {
    fn default() -> Self {
        Self {
            reason: ReturnReason::Defective,
            description: "El producto no cumple con las especificaciones anunciadas. \
                          La pantalla tiene píxeles muertos y no enciende correctamente."
                .to_string(),
            refund_method: RefundMethod::Wallet,
            quantity: 1,
        }
    }
}

/// Manager approval notes
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ApprovalFixture {
    pub evaluation_notes: String,
}

impl Default for ApprovalFixture {
    fn default() -> Self {
        Self {
            evaluation_notes: "Producto verificado. Píxeles muertos confirmados en zona \
                               superior derecha. Aprobada para reembolso completo."
                .to_string(),
        }
    }
}

/// Rejection flow: a second order and return that the manager turns down
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct RejectionFixture {
    /// Off by default: the flow creates an extra order on the backend
    pub enabled: bool,
    pub shipping_address: String,
    pub reason: ReturnReason,
    pub description: String,
    pub refund_method: RefundMethod,
    pub rejection_reason: String,
}

impl Default for RejectionFixture {
    fn default() -> Self {
        Self {
            enabled: false,
            shipping_address: "Avenida 6 de Agosto 456, La Paz".to_string(),
            reason: ReturnReason::ChangedMind,
            description: "Cambié de opinión, prefiero otro modelo".to_string(),
            refund_method: RefundMethod::Original,
            rejection_reason: "El motivo 'cambié de opinión' no está cubierto por nuestra \
                               política de devoluciones. Solo aceptamos devoluciones por \
                               defectos de fábrica o productos dañados."
                .to_string(),
        }
    }
}

/// Audit log query parameters
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct AuditFixture {
    pub page_size: u32,
}

impl Default for AuditFixture {
    fn default() -> Self {
        Self { page_size: 5 }
    }
}

impl Scenario {
    /// Load a scenario from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "Failed to read scenario '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_yaml(&content)
    }

    /// Parse and validate a scenario from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        let scenario: Scenario = serde_yaml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse scenario: {}", e)))?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Check the fixture values the backend would reject anyway
    pub fn validate(&self) -> Result<()> {
        if self.order.quantity == 0 {
            return Err(Error::Config("order.quantity must be at least 1".to_string()));
        }
        if self.return_request.quantity == 0 {
            return Err(Error::Config(
                "return_request.quantity must be at least 1".to_string(),
            ));
        }
        if self.audit.page_size == 0 {
            return Err(Error::Config("audit.page_size must be at least 1".to_string()));
        }

        let texts = [
            ("order.shipping_address", &self.order.shipping_address),
            ("order.payment_method", &self.order.payment_method),
            ("return_request.description", &self.return_request.description),
            ("approval.evaluation_notes", &self.approval.evaluation_notes),
        ];
        for (field, value) in texts {
            if value.trim().is_empty() {
                return Err(Error::Config(format!("{} must not be empty", field)));
            }
        }

        if self.rejection.enabled {
            let texts = [
                ("rejection.shipping_address", &self.rejection.shipping_address),
                ("rejection.description", &self.rejection.description),
                ("rejection.rejection_reason", &self.rejection.rejection_reason),
            ];
            for (field, value) in texts {
                if value.trim().is_empty() {
                    return Err(Error::Config(format!("{} must not be empty", field)));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scenario_is_valid() {
        let scenario = Scenario::default();
        scenario.validate().unwrap();
        assert_eq!(scenario.return_request.reason, ReturnReason::Defective);
        assert_eq!(scenario.return_request.refund_method, RefundMethod::Wallet);
        assert!(!scenario.rejection.enabled);
        assert_eq!(scenario.audit.page_size, 5);
    }

    #[test]
    fn test_yaml_overrides_only_given_fields() {
        let scenario = Scenario::from_yaml(
            r#"
name: Wrong item refund
order:
  fresh: true
return_request:
  reason: WRONG_ITEM
  refund_method: ORIGINAL
rejection:
  enabled: true
"#,
        )
        .unwrap();
        assert_eq!(scenario.name, "Wrong item refund");
        assert!(scenario.order.fresh);
        assert_eq!(scenario.order.payment_method, "CARD");
        assert_eq!(scenario.return_request.reason, ReturnReason::WrongItem);
        assert_eq!(scenario.return_request.refund_method, RefundMethod::Original);
        assert!(scenario.return_request.description.contains("píxeles"));
        assert!(scenario.rejection.enabled);
        assert_eq!(scenario.rejection.reason, ReturnReason::ChangedMind);
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let err = Scenario::from_yaml("return_request:\n  quantity: 0\n").unwrap_err();
        assert!(err.to_string().contains("return_request.quantity"));
    }

    #[test]
    fn test_blank_notes_rejected() {
        let err = Scenario::from_yaml("approval:\n  evaluation_notes: '  '\n").unwrap_err();
        assert!(err.to_string().contains("approval.evaluation_notes"));
    }

    #[test]
    fn test_bundled_scenario_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("scenarios/rejection.yaml");
        let scenario = Scenario::load(&path).unwrap();
        assert!(scenario.order.fresh);
        assert!(scenario.rejection.enabled);
        assert_eq!(scenario.audit.page_size, 10);
    }

    #[test]
    fn test_invalid_yaml_rejected() {
        let err = Scenario::from_yaml("order: [unterminated").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
