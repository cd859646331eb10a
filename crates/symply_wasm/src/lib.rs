//! WASM bridge exposing the law catalog to JavaScript.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use symply_core::{catalog, convert_to, Equation, Quantity, SolveSettings, Symbol, Unit};
use wasm_bindgen::prelude::*;

/// A quantity as it crosses the JS boundary: a value in a named unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantityValue {
    pub value: f64,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolInfo {
    pub name: String,
    pub dimension: String,
}

#[wasm_bindgen]
pub struct WasmLaw {
    equation: Equation,
}

#[wasm_bindgen]
impl WasmLaw {
    #[wasm_bindgen(constructor)]
    pub fn new(name: &str) -> Result<WasmLaw, JsValue> {
        console_error_panic_hook::set_once();
        let equation = catalog::find(name)
            .ok_or_else(|| JsValue::from_str(&format!("Unknown law: {}", name)))?;
        Ok(WasmLaw { equation })
    }

    pub fn name(&self) -> String {
        self.equation.name().to_string()
    }

    /// The law in readable infix form.
    pub fn formula(&self) -> String {
        self.equation.to_string()
    }

    pub fn symbols(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&symbol_infos(&self.equation))
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    /// Solves for `target`. `bindings` maps every other symbol name to
    /// `{ value, unit }`; `settings` is an optional `SolveSettings` object used
    /// only when the law cannot be isolated symbolically and is solved with
    /// Newton iteration. The result is expressed in `unit` when given, in SI
    /// base units otherwise.
    pub fn solve(
        &self,
        target: &str,
        bindings: JsValue,
        unit: Option<String>,
        settings: JsValue,
    ) -> Result<JsValue, JsValue> {
        let bindings: HashMap<String, QuantityValue> = serde_wasm_bindgen::from_value(bindings)
            .map_err(|e| JsValue::from_str(&format!("Invalid bindings: {}", e)))?;
        let settings: Option<SolveSettings> = if settings.is_undefined() || settings.is_null() {
            None
        } else {
            Some(
                serde_wasm_bindgen::from_value(settings)
                    .map_err(|e| JsValue::from_str(&format!("Invalid settings: {}", e)))?,
            )
        };
        let result = solve_law(&self.equation, target, &bindings, unit.as_deref(), settings)
            .map_err(|e| JsValue::from_str(&format!("{:#}", e)))?;
        serde_wasm_bindgen::to_value(&result)
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }
}

/// Names of every law in the catalog.
#[wasm_bindgen]
pub fn law_names() -> Vec<String> {
    catalog::all()
        .iter()
        .map(|entry| entry.name.to_string())
        .collect()
}

fn symbol_infos(equation: &Equation) -> Vec<SymbolInfo> {
    equation
        .symbols()
        .iter()
        .map(|symbol| SymbolInfo {
            name: symbol.name().to_string(),
            dimension: symbol.dimension().to_string(),
        })
        .collect()
}

fn find_symbol(symbols: &[Symbol], name: &str) -> anyhow::Result<Symbol> {
    symbols
        .iter()
        .find(|s| s.name() == name)
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("Law has no symbol named `{}`.", name))
}

pub(crate) fn solve_law(
    equation: &Equation,
    target: &str,
    bindings: &HashMap<String, QuantityValue>,
    unit: Option<&str>,
    settings: Option<SolveSettings>,
) -> anyhow::Result<QuantityValue> {
    let symbols = equation.symbols();
    let target = find_symbol(&symbols, target)?;

    let mut bound: Vec<(Symbol, Quantity)> = Vec::with_capacity(bindings.len());
    for (name, input) in bindings {
        let symbol = find_symbol(&symbols, name)?;
        let input_unit =
            Unit::parse(&input.unit).with_context(|| format!("Invalid unit for `{}`.", name))?;
        let quantity = Quantity::new(name.as_str(), symbol.dimension())
            .with_scale_factor(input.value, &input_unit)
            .with_context(|| format!("Invalid value for `{}`.", name))?;
        bound.push((symbol, quantity));
    }
    let pairs: Vec<(&Symbol, &Quantity)> = bound.iter().map(|(s, q)| (s, q)).collect();

    let result = equation.evaluate_with(&target, &pairs, &settings.unwrap_or_default())?;

    match unit {
        Some(text) => {
            let out_unit = Unit::parse(text).with_context(|| format!("Invalid unit `{}`.", text))?;
            Ok(QuantityValue {
                value: convert_to(&result, &out_unit)?,
                unit: text.to_string(),
            })
        }
        None => Ok(QuantityValue {
            value: result.value(),
            unit: result.dimension().to_string(),
        }),
    }
}
