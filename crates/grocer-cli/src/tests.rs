use super::*;

#[test]
fn parses_products_without_filters() {
    let cli = Cli::try_parse_from(["grocer-cli", "products"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::Products {
            site: None,
            location: None
        }
    ));
}

#[test]
fn parses_products_with_site_and_location() {
    let cli = Cli::try_parse_from([
        "grocer-cli",
        "products",
        "--site",
        "dmart",
        "--location",
        "andheri",
    ])
    .expect("expected valid cli args");

    match cli.command {
        Commands::Products { site, location } => {
            assert_eq!(site.as_deref(), Some("dmart"));
            assert_eq!(location.as_deref(), Some("andheri"));
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn location_requires_site() {
    let result = Cli::try_parse_from(["grocer-cli", "products", "--location", "pune"]);
    assert!(result.is_err());
}

#[test]
fn parses_parse_command() {
    let cli = Cli::try_parse_from(["grocer-cli", "parse", "output/dmart-mumbai.html"])
        .expect("expected valid cli args");

    match cli.command {
        Commands::Parse { file } => assert_eq!(file, "output/dmart-mumbai.html"),
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn scrape_requires_product_and_location() {
    assert!(Cli::try_parse_from(["grocer-cli", "scrape", "--product", "atta"]).is_err());

    let cli = Cli::try_parse_from([
        "grocer-cli",
        "scrape",
        "--product",
        "atta",
        "--location",
        "Mumbai",
    ])
    .expect("expected valid cli args");
    assert!(matches!(cli.command, Commands::Scrape { .. }));
}

#[test]
fn parses_health_command() {
    let cli = Cli::try_parse_from(["grocer-cli", "health"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Commands::Health));
}

#[test]
fn subcommand_is_required() {
    assert!(Cli::try_parse_from(["grocer-cli"]).is_err());
}
