//! Tolerant field extraction from provider JSON
//!
//! Upstream APIs rename fields between versions and mix numeric strings with
//! JSON numbers. Adapters list the aliases they accept as dot paths
//! (`"estimate.toAmount"`, `"steps.0.items"`); the first present one wins.

use serde_json::Value;
use xswap_types::BaseAmount;

/// Value at a dot path; numeric segments index into arrays
pub fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
	path.split('.').try_fold(value, |current, segment| {
		match current {
			Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
			Value::Object(map) => map.get(segment),
			_ => None,
		}
	})
	.filter(|found| !found.is_null())
}

/// First non-null value among the aliases
pub fn first<'a>(value: &'a Value, paths: &[&str]) -> Option<&'a Value> {
	paths.iter().find_map(|path| lookup(value, path))
}

fn scalar_string(value: &Value) -> Option<String> {
	match value {
		Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
		Value::Number(n) => Some(n.to_string()),
		Value::Bool(b) => Some(b.to_string()),
		_ => None,
	}
}

pub fn pick_string(value: &Value, paths: &[&str]) -> Option<String> {
	paths
		.iter()
		.filter_map(|path| lookup(value, path))
		.find_map(scalar_string)
}

/// Integer base-unit amount, from a digit string or a non-negative integer
pub fn pick_amount(value: &Value, paths: &[&str]) -> Option<BaseAmount> {
	paths
		.iter()
		.filter_map(|path| lookup(value, path))
		.find_map(|found| match found {
			Value::String(s) => BaseAmount::parse(s).ok(),
			Value::Number(n) => n
				.as_u64()
				.map(BaseAmount::from)
				.or_else(|| n.to_string().parse::<u128>().ok().map(BaseAmount::from)),
			_ => None,
		})
}

pub fn pick_f64(value: &Value, paths: &[&str]) -> Option<f64> {
	paths
		.iter()
		.filter_map(|path| lookup(value, path))
		.find_map(|found| match found {
			Value::Number(n) => n.as_f64(),
			Value::String(s) => s.trim().parse::<f64>().ok(),
			_ => None,
		})
		.filter(|v| v.is_finite())
}

pub fn pick_u64(value: &Value, paths: &[&str]) -> Option<u64> {
	pick_f64(value, paths)
		.filter(|v| *v >= 0.0)
		.map(|v| v.round() as u64)
}

pub fn pick_bool(value: &Value, paths: &[&str]) -> Option<bool> {
	paths
		.iter()
		.filter_map(|path| lookup(value, path))
		.find_map(|found| match found {
			Value::Bool(b) => Some(*b),
			Value::String(s) => s.parse::<bool>().ok(),
			_ => None,
		})
}

/// Sum of a numeric field across an array; `None` when nothing is present
pub fn sum_field(value: &Value, array_path: &str, field: &str) -> Option<f64> {
	let items = lookup(value, array_path)?.as_array()?;
	items
		.iter()
		.filter_map(|item| pick_f64(item, &[field]))
		.fold(None, |acc, v| Some(acc.unwrap_or(0.0) + v))
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_lookup_walks_objects_and_arrays() {
		let body = json!({"steps": [{"items": [{"data": {"to": "0xabc"}}]}]});
		assert_eq!(
			pick_string(&body, &["steps.0.items.0.data.to"]),
			Some("0xabc".to_string())
		);
		assert!(lookup(&body, "steps.3").is_none());
		assert!(lookup(&body, "steps.x").is_none());
	}

	#[test]
	fn test_first_alias_wins_and_nulls_are_skipped() {
		let body = json!({"toAmount": null, "estimate": {"toAmount": "42"}, "outAmount": "7"});
		assert_eq!(
			pick_amount(&body, &["toAmount", "estimate.toAmount", "outAmount"]),
			Some(BaseAmount::from(42u64))
		);
	}

	#[test]
	fn test_numbers_and_numeric_strings() {
		let body = json!({"a": 12, "b": "3.5", "c": "1e3", "d": "-1", "e": 1.5});
		assert_eq!(pick_amount(&body, &["a"]), Some(BaseAmount::from(12u64)));
		assert_eq!(pick_amount(&body, &["d"]), None);
		assert_eq!(pick_amount(&body, &["e"]), None);
		assert_eq!(pick_f64(&body, &["b"]), Some(3.5));
		assert_eq!(pick_u64(&body, &["c"]), Some(1000));
		assert_eq!(pick_string(&body, &["a"]), Some("12".to_string()));
	}

	#[test]
	fn test_sum_field() {
		let body = json!({"gasCosts": [{"amountUSD": "1.25"}, {"amountUSD": 0.75}, {"other": 1}]});
		assert_eq!(sum_field(&body, "gasCosts", "amountUSD"), Some(2.0));
		assert_eq!(sum_field(&body, "feeCosts", "amountUSD"), None);
		assert_eq!(sum_field(&json!({"gasCosts": []}), "gasCosts", "amountUSD"), None);
	}
}
