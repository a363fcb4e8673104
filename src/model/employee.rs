use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::role::Role;

/// A deduction or a bonus line on a payslip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PayItem {
    #[serde(rename = "concepto")]
    #[schema(example = "salud")]
    pub concept: String,

    #[serde(rename = "monto")]
    #[schema(example = 80000.0)]
    pub amount: f64,
}

impl PayItem {
    pub fn new(concept: impl Into<String>, amount: f64) -> Self {
        Self {
            concept: concept.into(),
            amount,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "correo": "ana.ruiz@empresa.co",
        "nombre": "Ana",
        "apellido": "Ruiz",
        "rol": "empleado",
        "salario_base": 2000.0,
        "deducciones": [{"concepto": "tax", "monto": 50.0}],
        "bonificaciones": [{"concepto": "perf", "monto": 100.0}],
        "direccion": "Calle 10 # 5-20",
        "celular": "3001234567",
        "superadmin": false
    })
)]
pub struct Employee {
    pub id: u64,

    #[serde(rename = "correo")]
    pub email: String,

    #[serde(rename = "nombre")]
    pub first_name: String,

    #[serde(rename = "apellido")]
    pub last_name: String,

    #[serde(rename = "rol")]
    pub role: Role,

    #[serde(rename = "salario_base")]
    pub base_salary: f64,

    #[serde(rename = "deducciones")]
    pub deductions: Vec<PayItem>,

    #[serde(rename = "bonificaciones")]
    pub bonuses: Vec<PayItem>,

    /// Argon2 PHC string. Never serialized back out.
    #[serde(rename = "contrasena", default, skip_serializing)]
    pub credential: String,

    // Payslips never read the last three, so on-demand records may omit them.
    #[serde(rename = "direccion", default)]
    pub address: String,

    #[serde(rename = "celular", default)]
    pub phone: String,

    #[serde(default)]
    pub superadmin: bool,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Employee fields before an identifier has been assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEmployee {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub base_salary: f64,
    pub deductions: Vec<PayItem>,
    pub bonuses: Vec<PayItem>,
    pub credential: String,
    pub address: String,
    pub phone: String,
    pub superadmin: bool,
}

impl NewEmployee {
    pub fn with_id(self, id: u64) -> Employee {
        Employee {
            id,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            role: self.role,
            base_salary: self.base_salary,
            deductions: self.deductions,
            bonuses: self.bonuses,
            credential: self.credential,
            address: self.address,
            phone: self.phone,
            superadmin: self.superadmin,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_spanish_wire_keys() {
        let employee: Employee = serde_json::from_value(serde_json::json!({
            "id": 7,
            "correo": "ana@empresa.co",
            "nombre": "Ana",
            "apellido": "Ruiz",
            "rol": "gestor_rrhh",
            "salario_base": 2000,
            "deducciones": [{"concepto": "tax", "monto": 50}],
            "bonificaciones": [],
            "contrasena": "secreto",
            "direccion": "Calle 1",
            "celular": "3001234567",
            "superadmin": false
        }))
        .unwrap();

        assert_eq!(employee.id, 7);
        assert_eq!(employee.role, Role::HrManager);
        assert_eq!(employee.deductions, vec![PayItem::new("tax", 50.0)]);
        assert_eq!(employee.credential, "secreto");
    }

    #[test]
    fn credential_is_never_serialized() {
        let mut employee = fixtures::employee(1, "Ana", "Ruiz");
        employee.credential = "$argon2id$secret".to_string();
        let json = serde_json::to_value(&employee).unwrap();
        assert!(json.get("contrasena").is_none());
        assert_eq!(json["nombre"], "Ana");
    }
}
