//! Subcommand execution

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use shared::{EditableField, NewRecharge, OrderId};
use thunder_client::edit::RowEditor;
use thunder_client::site_config::SiteConfigForm;
use thunder_client::{AdminClient, ClientError, FetchOutcome, SaveOutcome, ToastKind};

use crate::cli::{Cli, Command, ConfigCommand, ConfigSetArgs};
use crate::console::{ConsoleNotifier, render_dashboard, render_orders};
use crate::prompt::{StdinPrompt, confirm};

/// Attach the operator-facing message to a client error
fn operator(err: ClientError) -> anyhow::Error {
    let message = err.user_message();
    anyhow::Error::new(err).context(message)
}

pub async fn run(cli: Cli) -> Result<()> {
    let client_config = cli.client_config();
    tracing::debug!(base_url = %client_config.base_url, "Using backend");

    let client = AdminClient::new(
        client_config,
        Some(Arc::new(ConsoleNotifier)),
        Some(Arc::new(StdinPrompt)),
    )
    .map_err(operator)?;
    if let Some(password) = &cli.password {
        client.session().set_credential(password.clone()).await;
    }

    match cli.command {
        Command::Wait => wait(&client).await,
        Command::List { page, filter } => {
            ready(&client).await?;
            let outcome = client
                .orders()
                .fetch_page(page, &filter.to_filter())
                .await
                .map_err(operator)?;
            if let FetchOutcome::Applied(page) = outcome {
                print!("{}", render_orders(&page));
            }
            Ok(())
        }
        Command::Dashboard => {
            ready(&client).await?;
            client.session().authorize().await.map_err(operator)?;
            match client.dashboard().fetch().await.map_err(operator)? {
                Some(summary) => print!("{}", render_dashboard(&summary)),
                None => bail!("Dashboard unavailable"),
            }
            Ok(())
        }
        Command::Edit {
            id,
            page,
            status,
            comment,
            name,
            phone,
            plan,
            app_password,
        } => {
            let changes = [
                (EditableField::Status, status.map(|s| s.as_str().to_string())),
                (EditableField::AdminComment, comment),
                (EditableField::Name, name),
                (EditableField::Phone, phone),
                (EditableField::Plan, plan),
                (EditableField::AppPassword, app_password),
            ];
            edit(&client, OrderId::new(id), page, changes).await
        }
        Command::Set { id, field, value } => {
            ready(&client).await?;
            let refresh = client
                .editor()
                .update_field(&OrderId::new(id), field, value)
                .await
                .map_err(operator)?;
            if let Some(handle) = refresh {
                handle.await.ok();
            }
            Ok(())
        }
        Command::Add {
            name,
            phone,
            carrier,
            plan,
            app_password,
        } => {
            ready(&client).await?;
            let order = NewRecharge {
                name,
                phone,
                carrier,
                plan,
                app_password,
            };
            let message = client.add_order(&order).await.map_err(operator)?;
            println!("{message}");
            Ok(())
        }
        Command::Delete { id, yes } => {
            if !yes && !confirm(&format!("Tem certeza que deseja excluir o pedido {id}?")) {
                println!("Cancelado.");
                return Ok(());
            }
            ready(&client).await?;
            client.orders().refresh().await.map_err(operator)?;
            client
                .remove_order(&OrderId::new(id))
                .await
                .map_err(operator)?;
            println!("Pedido excluído com sucesso!");
            Ok(())
        }
        Command::Export {
            format,
            out,
            filter,
        } => {
            ready(&client).await?;
            let file = client
                .orders()
                .export(format, &filter.to_filter())
                .await
                .map_err(operator)?;
            let path = file
                .write_to(&out)
                .await
                .with_context(|| format!("Failed to write export into {}", out.display()))?;
            client.notifier().toast(ToastKind::Exported);
            println!("{}", path.display());
            Ok(())
        }
        Command::Config { command } => config(&client, command).await,
    }
}

/// Probe only and report the result
async fn wait(client: &AdminClient) -> Result<()> {
    if client.prober().ensure_ready().await {
        println!("Servidor conectado.");
        Ok(())
    } else {
        bail!(ClientError::NotReady.user_message())
    }
}

async fn ready(client: &AdminClient) -> Result<()> {
    if client.prober().ensure_ready().await {
        Ok(())
    } else {
        let err = ClientError::NotReady;
        client.notifier().alert(&err.user_message());
        Err(operator(err))
    }
}

async fn edit(
    client: &AdminClient,
    id: OrderId,
    page: u32,
    changes: [(EditableField, Option<String>); 6],
) -> Result<()> {
    ready(client).await?;
    client
        .orders()
        .fetch_page(page, &Default::default())
        .await
        .map_err(operator)?;
    let order = client
        .orders()
        .find(&id)
        .await
        .with_context(|| format!("Order {id} is not on page {page}"))?;

    let mut row = RowEditor::new(order);
    row.begin_edit().map_err(operator)?;
    for (field, value) in changes {
        if let Some(value) = value {
            row.set_field(field, value).map_err(operator)?;
        }
    }

    loop {
        match client.save_row(&mut row).await {
            SaveOutcome::Saved { dashboard_refresh } => {
                if let Some(handle) = dashboard_refresh {
                    handle.await.ok();
                }
                return Ok(());
            }
            SaveOutcome::Unchanged => {
                println!("Nenhuma alteração.");
                return Ok(());
            }
            SaveOutcome::Failed(err) => return Err(operator(err)),
            // A fresh password was entered; the row is still in Editing
            SaveOutcome::AuthExpired {
                reload_required: false,
            } => continue,
            SaveOutcome::AuthExpired {
                reload_required: true,
            } => return Err(operator(ClientError::Unauthorized)),
        }
    }
}

async fn config(client: &AdminClient, command: ConfigCommand) -> Result<()> {
    let store = client.site_config();
    let current = store.load_config().await.map_err(operator)?;

    match command {
        ConfigCommand::Show => {
            println!("{}", serde_json::to_string_pretty(&current)?);
            Ok(())
        }
        ConfigCommand::Set(args) => {
            let form = apply_args(SiteConfigForm::from_config(&current), args);
            let saved = store.save_form(&form).await.map_err(operator)?;
            tracing::info!(title = ?saved.header_title, "Configuration updated");
            println!("Configurações salvas com sucesso!");
            Ok(())
        }
    }
}

fn apply_args(mut form: SiteConfigForm, args: ConfigSetArgs) -> SiteConfigForm {
    let text_fields = [
        (&mut form.header_title, args.header_title),
        (&mut form.header_subtitle, args.header_subtitle),
        (&mut form.footer_warning, args.footer_warning),
        (&mut form.pix_key, args.pix_key),
        (&mut form.pix_name, args.pix_name),
    ];
    for (slot, value) in text_fields {
        if let Some(value) = value {
            *slot = value;
        }
    }

    let plan_fields = [
        (&mut form.tim_plans, args.tim_plans),
        (&mut form.vivo_plans, args.vivo_plans),
        (&mut form.claro_plans, args.claro_plans),
    ];
    for (slot, plans) in plan_fields {
        if !plans.is_empty() {
            *slot = plans.join("\n");
        }
    }
    form
}
