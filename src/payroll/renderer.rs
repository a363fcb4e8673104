use std::fmt::Write;

use serde_json::Value;

use crate::error::RenderError;
use crate::model::employee::{Employee, PayItem};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PayTotals {
    pub total_deducciones: f64,
    pub total_bonificaciones: f64,
    pub total_a_pagar: f64,
}

impl PayTotals {
    /// Net pay is not clamped and can be negative.
    pub fn of(employee: &Employee) -> Self {
        let total_deducciones = sum(&employee.deductions);
        let total_bonificaciones = sum(&employee.bonuses);
        Self {
            total_deducciones,
            total_bonificaciones,
            total_a_pagar: employee.base_salary + total_bonificaciones - total_deducciones,
        }
    }
}

fn sum(items: &[PayItem]) -> f64 {
    items.iter().map(|item| item.amount).sum()
}

/// A rendered payslip, owned by the batch for one dispatch cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Payslip {
    pub employee_id: u64,
    pub document_name: String,
    pub content: String,
    pub totals: PayTotals,
}

/// `desprendible_{nombre}_{apellido}_{id}.txt`, with the id keeping namesakes apart.
pub fn document_name(employee: &Employee) -> String {
    format!(
        "desprendible_{}_{}_{}.txt",
        sanitize(&employee.first_name),
        sanitize(&employee.last_name),
        employee.id
    )
}

fn sanitize(part: &str) -> String {
    part.trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}

fn validate(employee: &Employee) -> Result<(), String> {
    let required = [
        ("nombre", &employee.first_name),
        ("apellido", &employee.last_name),
        ("correo", &employee.email),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(format!("field `{field}` is empty"));
        }
    }

    if !employee.base_salary.is_finite() {
        return Err("field `salario_base` is not a finite number".to_string());
    }

    let items = employee
        .deductions
        .iter()
        .map(|d| ("deducciones", d))
        .chain(employee.bonuses.iter().map(|b| ("bonificaciones", b)));
    for (field, item) in items {
        if !item.amount.is_finite() {
            return Err(format!(
                "`{field}` entry `{}` has a non-finite amount",
                item.concept
            ));
        }
    }

    Ok(())
}

/// Render the payslip text for one employee. Same input, same bytes.
pub fn render(employee: &Employee) -> Result<Payslip, RenderError> {
    validate(employee).map_err(|cause| RenderError {
        employee_id: Some(employee.id),
        cause,
    })?;

    let totals = PayTotals::of(employee);
    let mut doc = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(doc, "Desprendible de pago para {}\n", employee.full_name());
    let _ = writeln!(doc, "Correo: {}\n", employee.email);
    let _ = writeln!(doc, "ID Empleado: {}", employee.id);
    let _ = writeln!(doc, "Rol: {}", employee.role);
    let _ = writeln!(doc, "Salario Base: {}\n", employee.base_salary);

    doc.push_str("Deducciones:\n");
    for item in &employee.deductions {
        let _ = writeln!(doc, "- {}: {}", item.concept, item.amount);
    }
    doc.push_str("\nBonificaciones:\n");
    for item in &employee.bonuses {
        let _ = writeln!(doc, "- {}: {}", item.concept, item.amount);
    }

    let _ = writeln!(doc, "\nTotal Deducciones: {}", totals.total_deducciones);
    let _ = writeln!(doc, "Total Bonificaciones: {}", totals.total_bonificaciones);
    let _ = write!(doc, "\nTotal a Pagar: {}", totals.total_a_pagar);

    Ok(Payslip {
        employee_id: employee.id,
        document_name: document_name(employee),
        content: doc,
        totals,
    })
}

/// Render from a raw JSON record, as received by the on-demand trigger.
/// Returns the parsed employee too so the caller can dispatch it.
pub fn render_value(value: &Value) -> Result<(Employee, Payslip), RenderError> {
    let employee: Employee =
        serde_json::from_value(value.clone()).map_err(|e| RenderError {
            employee_id: value.get("id").and_then(Value::as_u64),
            cause: e.to_string(),
        })?;
    let payslip = render(&employee)?;
    Ok((employee, payslip))
}
