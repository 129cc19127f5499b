use ar_runtime::UrlResolver;
use url::Url;

pub fn run(input: &str, base: Option<&str>) -> Result<(), String> {
    let resolver = match base {
        Some(base) => {
            let base = Url::parse(base).map_err(|e| format!("invalid base URL \"{base}\": {e}"))?;
            UrlResolver::new(base)
        }
        None => UrlResolver::detached(),
    };

    let parsed = resolver.parse_url(input).map_err(|e| e.to_string())?;
    let fields = [
        ("href", &parsed.href),
        ("protocol", &parsed.protocol),
        ("host", &parsed.host),
        ("hostname", &parsed.hostname),
        ("port", &parsed.port),
        ("pathname", &parsed.pathname),
        ("search", &parsed.search),
        ("hash", &parsed.hash),
    ];
    for (label, value) in fields {
        println!("  {:<9} {value}", format!("{label}:"));
    }

    Ok(())
}
