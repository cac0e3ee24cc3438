//! Query command handler for the sample resources

use anyhow::{Context, Result};
use colored::*;
use serde::Serialize;
use serde_json::{Map, Value};
use service_layer::api::query::QueryBuilder;
use service_layer::{Filter, Query, field};
use std::time::Instant;
use tokio_util::sync::CancellationToken;

use super::{FilterArgs, OutputFormat, QueryCommands, ResourceKind};
use crate::cli::commands::ConnectionArgs;
use crate::models::{BusinessPartner, Item, Searchable};

/// Handle `items` and `partners` subcommands
pub async fn handle_query_command(
    kind: ResourceKind,
    action: QueryCommands,
    connection: &ConnectionArgs,
    cancel: &CancellationToken,
) -> Result<()> {
    match kind {
        ResourceKind::Items => run::<Item>(action, connection, cancel).await,
        ResourceKind::Partners => run::<BusinessPartner>(action, connection, cancel).await,
    }
}

async fn run<T: Searchable>(
    action: QueryCommands,
    connection: &ConnectionArgs,
    cancel: &CancellationToken,
) -> Result<()> {
    let resource = T::resource_name();

    match action {
        QueryCommands::List {
            filters,
            top,
            skip,
            output,
        } => {
            let query = build_query::<T>(&filters, top, skip)?;
            if output.dry {
                println!("{}", QueryBuilder::new(T::schema()).build_uri(&resource, &query)?);
                return Ok(());
            }

            let context = connection.connect()?;
            let started = Instant::now();
            let rows = context
                .set::<T>()
                .with_query(query)
                .to_list(cancel)
                .await
                .with_context(|| format!("Failed to list {}", resource))?;
            log::info!(
                "{} {} in {:.2}ms",
                rows.len(),
                resource,
                started.elapsed().as_secs_f64() * 1000.0
            );

            println!("{}", format_output(&rows, &T::schema().wire_names(), &output.format)?);
            context.logout(cancel).await;
        }
        QueryCommands::Get { code, output } => {
            let query = Query::new().with_filter(field(T::CODE_FIELD).eq(code.as_str()));
            if output.dry {
                println!("{}", QueryBuilder::new(T::schema()).build_uri(&resource, &query)?);
                return Ok(());
            }

            let context = connection.connect()?;
            let found = context
                .set::<T>()
                .with_query(query)
                .first(cancel)
                .await
                .with_context(|| format!("Failed to fetch {} '{}'", resource, code))?;
            context.logout(cancel).await;

            let Some(row) = found else {
                anyhow::bail!("No {} with {} '{}'", resource, T::CODE_FIELD, code);
            };
            println!("{}", format_output(&row, &T::schema().wire_names(), &output.format)?);
        }
        QueryCommands::Count { filters, dry } => {
            let query = build_query::<T>(&filters, None, None)?;
            if dry {
                println!(
                    "{}",
                    QueryBuilder::new(T::schema()).build_count_uri(&resource, &query)?
                );
                return Ok(());
            }

            let context = connection.connect()?;
            let count = context
                .set::<T>()
                .with_query(query)
                .count(cancel)
                .await
                .with_context(|| format!("Failed to count {}", resource))?;
            context.logout(cancel).await;

            println!("{} {}", count.to_string().bold(), resource.dimmed());
        }
    }

    Ok(())
}

/// Combine the filter flags into one predicate, `None` when none is set
pub fn build_predicate<T: Searchable>(filters: &FilterArgs) -> Result<Option<Filter>> {
    let mut parts = Vec::new();

    if let Some(prefix) = &filters.code_prefix {
        parts.push(field(T::CODE_FIELD).starts_with(prefix));
    }
    if let Some(text) = &filters.name_contains {
        parts.push(field(T::NAME_FIELD).contains(text));
    }
    if let Some(since) = &filters.created_since {
        let date = chrono::NaiveDate::parse_from_str(since, "%Y-%m-%d")
            .with_context(|| format!("Invalid --created-since date '{}', expected YYYY-MM-DD", since))?;
        parts.push(field(T::CREATED_FIELD).ge(date));
    }

    Ok(parts.into_iter().reduce(|acc, next| acc.and(next)))
}

fn build_query<T: Searchable>(
    filters: &FilterArgs,
    top: Option<u32>,
    skip: Option<u32>,
) -> Result<Query> {
    let mut query = match build_predicate::<T>(filters)? {
        Some(predicate) => Query::new().with_filter(predicate),
        None => Query::new(),
    };
    if let Some(top) = top {
        query = query.with_top(top);
    }
    if let Some(skip) = skip {
        query = query.with_skip(skip);
    }
    Ok(query)
}

/// Render results in the requested format. CSV columns follow `columns`,
/// the entity's wire names in declaration order.
fn format_output<S: Serialize>(rows: &S, columns: &[&str], format: &OutputFormat) -> Result<String> {
    let data = serde_json::to_value(rows).context("Failed to serialize results")?;
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(&data).context("Failed to format JSON output")
        }
        OutputFormat::JsonCompact => {
            serde_json::to_string(&data).context("Failed to format JSON output")
        }
        OutputFormat::Csv => records_to_csv(&data, columns),
    }
}

/// One CSV record per entity; a single entity is written as a one-row table
fn records_to_csv(data: &Value, columns: &[&str]) -> Result<String> {
    let records: Vec<&Map<String, Value>> = match data {
        Value::Array(items) => items.iter().filter_map(Value::as_object).collect(),
        Value::Object(record) => vec![record],
        other => anyhow::bail!("Cannot write {} as CSV records", other),
    };

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(columns).context("Failed to write CSV header")?;
    for record in records {
        writer
            .write_record(columns.iter().map(|column| cell(record.get(*column))))
            .context("Failed to write CSV record")?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV output: {}", e.error()))?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}

/// Missing and null values become empty cells, nested values stay JSON
fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}
