use super::ui;
use crate::app::App;
use crate::core::transaction::User;
use anyhow::Result;

fn print_user(user: &User) {
    println!(
        "{} <{}>",
        ui::style_text(&user.username, ui::StyleType::TotalLabel),
        user.email
    );
    println!(
        "Balance: {}",
        ui::style_text(&ui::format_money(user.balance), balance_style(user))
    );
}

fn balance_style(user: &User) -> ui::StyleType {
    if user.balance.is_sign_negative() {
        ui::StyleType::Expense
    } else {
        ui::StyleType::Income
    }
}

pub async fn sign_up(app: &App, username: &str, email: &str, password: &str) -> Result<()> {
    let user = app.sign_up(username, email, password).await?;
    println!("Registered and signed in.");
    print_user(&user);
    Ok(())
}

pub async fn login(app: &App, email: &str, password: &str) -> Result<()> {
    let user = app.sign_in(email, password).await?;
    println!("Signed in.");
    print_user(&user);
    Ok(())
}

pub async fn logout(app: &App) -> Result<()> {
    if !app.restore_session().await? {
        println!("Not signed in.");
        return Ok(());
    }
    app.sign_out().await?;
    println!("Signed out.");
    Ok(())
}

pub async fn whoami(app: &App) -> Result<()> {
    let user = app.refresh_user().await?;
    print_user(&user);
    Ok(())
}
