//! Reconnaissance tools: DNS, whois, route tracing, port scanning,
//! SMB enumeration, exploit search and subdomain enumeration.

use std::path::PathBuf;
use std::sync::Arc;

use toolbench_domain::tool::{
    BuildError, CommandLine, ParamType, ParameterSpec, ToolBinding, ToolCategory, ToolDescriptor,
    ValidatedParams,
};

use super::{BuiltinTool, choice, int_in, operand, optional_operand};
use crate::tools::artifacts::SubdomainCount;
use crate::tools::paths::ToolPaths;

pub const RECORD_TYPES: [&str; 8] = ["A", "AAAA", "MX", "NS", "TXT", "CNAME", "SOA", "ANY"];

pub const NMAP_SCAN_TYPES: [&str; 6] = ["quick", "basic", "version", "aggressive", "stealth", "udp"];

const NMAP_OUTPUT_FORMATS: [&str; 3] = ["normal", "verbose", "xml"];

pub const ENUM4LINUX_SCAN_TYPES: [&str; 5] = ["all", "users", "shares", "groups", "password_policy"];

pub(super) fn echo_test() -> BuiltinTool {
    let descriptor = ToolDescriptor::new(
        "echo_test",
        ToolCategory::Utilities,
        "Print a message back; used to check the execution path",
    )
    .with_binary("/bin/echo")
    .with_parameter(ParameterSpec::required("message", "Text to print"))
    .with_timeout_secs(10);

    let binding = ToolBinding::new(|params: &ValidatedParams| -> Result<CommandLine, BuildError> {
        let message = params
            .get_str("message")
            .ok_or_else(|| BuildError::invalid("message", "must be set"))?;
        Ok(CommandLine::new("/bin/echo").arg(message))
    });

    BuiltinTool::new(descriptor, binding, "coreutils")
}

pub(super) fn dig() -> BuiltinTool {
    let descriptor = ToolDescriptor::new("dig", ToolCategory::Dns, "DNS lookup")
        .with_parameter(ParameterSpec::required("domain", "Domain to query"))
        .with_parameter(
            ParameterSpec::optional("record_type", "DNS record type")
                .choice(RECORD_TYPES)
                .with_default("A"),
        )
        .with_parameter(ParameterSpec::optional(
            "dns_server",
            "Resolver to ask instead of the system one",
        ))
        .with_timeout_secs(30);

    let binding = ToolBinding::new(|params: &ValidatedParams| -> Result<CommandLine, BuildError> {
        let mut cmd = CommandLine::new("dig")
            .arg(operand(params, "domain")?)
            .arg(choice(params, "record_type")?);
        if let Some(server) = optional_operand(params, "dns_server")? {
            let server = server.strip_prefix('@').unwrap_or(server);
            cmd.push(format!("@{}", server));
        }
        Ok(cmd)
    });

    BuiltinTool::new(descriptor, binding, "dnsutils")
}

pub(super) fn whois() -> BuiltinTool {
    let descriptor = ToolDescriptor::new(
        "whois",
        ToolCategory::InfoGathering,
        "Domain and IP registration lookup",
    )
    .with_parameter(ParameterSpec::required("target", "Domain or IP address"))
    .with_timeout_secs(30);

    let binding = ToolBinding::new(|params: &ValidatedParams| -> Result<CommandLine, BuildError> {
        Ok(CommandLine::new("whois").arg(operand(params, "target")?))
    });

    BuiltinTool::new(descriptor, binding, "whois")
}

pub(super) fn traceroute() -> BuiltinTool {
    let descriptor = ToolDescriptor::new(
        "traceroute",
        ToolCategory::NetworkScan,
        "Trace the route packets take to a host",
    )
    .with_parameter(ParameterSpec::required("target", "Host or IP address"))
    .with_parameter(
        ParameterSpec::optional("max_hops", "Maximum number of hops")
            .with_type(ParamType::Integer)
            .with_default(30i64),
    )
    .with_timeout_secs(120);

    let binding = ToolBinding::new(|params: &ValidatedParams| -> Result<CommandLine, BuildError> {
        let max_hops = int_in(params, "max_hops", 1..=255)?;
        Ok(CommandLine::new("traceroute")
            .arg("-m")
            .arg(max_hops.to_string())
            .arg(operand(params, "target")?))
    });

    BuiltinTool::new(descriptor, binding, "traceroute")
}

pub(super) fn nmap() -> BuiltinTool {
    let descriptor = ToolDescriptor::new(
        "nmap",
        ToolCategory::NetworkScan,
        "Network exploration and port scanning",
    )
    .with_parameter(ParameterSpec::required(
        "target",
        "IP, CIDR range or hostname (e.g. 192.168.1.0/24)",
    ))
    .with_parameter(
        ParameterSpec::optional("ports", "Ports to scan (e.g. 80, 1-1000, 80,443, -)")
            .with_default("1-1000"),
    )
    .with_parameter(
        ParameterSpec::optional("scan_type", "Kind of scan")
            .choice(NMAP_SCAN_TYPES)
            .with_default("basic"),
    )
    .with_parameter(
        ParameterSpec::optional("output_format", "Output format")
            .choice(NMAP_OUTPUT_FORMATS)
            .with_default("normal"),
    )
    .with_timeout_secs(600);

    BuiltinTool::new(descriptor, ToolBinding::new(build_nmap), "nmap")
}

fn build_nmap(params: &ValidatedParams) -> Result<CommandLine, BuildError> {
    let target = operand(params, "target")?;
    let ports = params.non_empty_str("ports").unwrap_or("1-1000").trim();
    let scan_type = choice(params, "scan_type")?;

    let mut cmd = CommandLine::new("nmap");
    if scan_type == "quick" {
        cmd.push("-F");
    } else {
        let flag = match scan_type {
            "basic" => None,
            "version" => Some("-sV"),
            "aggressive" => Some("-A"),
            "stealth" => Some("-sS"),
            "udp" => Some("-sU"),
            other => {
                return Err(BuildError::invalid(
                    "scan_type",
                    format!("unsupported scan type '{}'", other),
                ));
            }
        };
        check_port_spec(ports)?;
        if let Some(flag) = flag {
            cmd.push(flag);
        }
        cmd.push("-p");
        cmd.push(ports);
    }

    match params.get_str("output_format") {
        Some("verbose") => cmd.push("-v"),
        Some("xml") => {
            cmd.push("-oX");
            cmd.push("-");
        }
        _ => {}
    }

    Ok(cmd.arg(target))
}

/// `-` (all ports) or a comma list of `N` / `N-M` with 1 <= N <= M <= 65535.
fn check_port_spec(spec: &str) -> Result<(), BuildError> {
    if spec == "-" {
        return Ok(());
    }
    let invalid = |reason: String| BuildError::invalid("ports", reason);
    let port = |s: &str| -> Result<u32, BuildError> {
        let n: u32 = s
            .trim()
            .parse()
            .map_err(|_| invalid(format!("'{}' is not a port number", s)))?;
        if (1..=65535).contains(&n) {
            Ok(n)
        } else {
            Err(invalid(format!("port {} is outside 1-65535", n)))
        }
    };

    for part in spec.split(',') {
        match part.split_once('-') {
            Some((low, high)) => {
                let (low, high) = (port(low)?, port(high)?);
                if low > high {
                    return Err(invalid(format!("range {}-{} is reversed", low, high)));
                }
            }
            None => {
                port(part)?;
            }
        }
    }
    Ok(())
}

pub(super) fn masscan() -> BuiltinTool {
    let descriptor = ToolDescriptor::new(
        "masscan",
        ToolCategory::NetworkScan,
        "Asynchronous port scanner for large ranges",
    )
    .with_parameter(ParameterSpec::required(
        "target",
        "IP, range or CIDR network (e.g. 192.168.1.0/24)",
    ))
    .with_parameter(
        ParameterSpec::optional("ports", "Ports to scan (e.g. 80,443 or 1-10000)")
            .with_default("1-1000"),
    )
    .with_parameter(
        ParameterSpec::optional("rate", "Packets per second")
            .with_type(ParamType::Integer)
            .with_default(100i64),
    )
    .with_timeout_secs(600);

    let binding = ToolBinding::new(|params: &ValidatedParams| -> Result<CommandLine, BuildError> {
        let target = operand(params, "target")?;
        let ports = match params.non_empty_str("ports").unwrap_or("1-1000").trim() {
            "-" => "1-65535",
            ports => {
                check_port_spec(ports)?;
                ports
            }
        };
        let rate = int_in(params, "rate", 1..=1_000_000)?;
        Ok(CommandLine::new("masscan")
            .arg(target)
            .arg(format!("-p{}", ports))
            .arg(format!("--rate={}", rate)))
    });

    BuiltinTool::new(descriptor, binding, "masscan")
}

/// Port check with `nc -z`. Data is never sent: the process gets no stdin.
pub(super) fn netcat() -> BuiltinTool {
    let descriptor = ToolDescriptor::new(
        "netcat",
        ToolCategory::NetworkScan,
        "Check whether a TCP or UDP port accepts connections",
    )
    .with_binary("nc")
    .with_parameter(ParameterSpec::required("host", "Host to connect to"))
    .with_parameter(ParameterSpec::required("port", "Port").with_type(ParamType::Integer))
    .with_parameter(
        ParameterSpec::optional("timeout", "Connect timeout in seconds")
            .with_type(ParamType::Integer)
            .with_default(5i64),
    )
    .with_parameter(
        ParameterSpec::optional("udp", "Use UDP instead of TCP")
            .with_type(ParamType::Flag)
            .with_default(false),
    )
    .with_timeout_secs(30);

    let binding = ToolBinding::new(|params: &ValidatedParams| -> Result<CommandLine, BuildError> {
        // Stays under the 30 s process timeout
        let timeout = int_in(params, "timeout", 1..=25)?;
        let port = int_in(params, "port", 1..=65535)?;
        Ok(CommandLine::new("nc")
            .arg("-w")
            .arg(timeout.to_string())
            .arg("-vz")
            .arg_if(params.get_bool("udp").unwrap_or(false), "-u")
            .arg(operand(params, "host")?)
            .arg(port.to_string()))
    });

    BuiltinTool::new(descriptor, binding, "netcat-openbsd")
}

pub(super) fn enum4linux() -> BuiltinTool {
    let descriptor = ToolDescriptor::new(
        "enum4linux",
        ToolCategory::Enumeration,
        "Enumerate users, shares and policies of Windows/Samba hosts over SMB",
    )
    .with_parameter(ParameterSpec::required("target", "Host IP"))
    .with_parameter(
        ParameterSpec::optional("scan_type", "What to enumerate")
            .choice(ENUM4LINUX_SCAN_TYPES)
            .with_default("all"),
    )
    .with_timeout_secs(300);

    let binding = ToolBinding::new(|params: &ValidatedParams| -> Result<CommandLine, BuildError> {
        let flag = match choice(params, "scan_type")? {
            "all" => "-a",
            "users" => "-U",
            "shares" => "-S",
            "groups" => "-G",
            "password_policy" => "-P",
            other => {
                return Err(BuildError::invalid(
                    "scan_type",
                    format!("unsupported scan type '{}'", other),
                ));
            }
        };
        Ok(CommandLine::new("enum4linux")
            .arg(flag)
            .arg(operand(params, "target")?))
    });

    BuiltinTool::new(descriptor, binding, "enum4linux")
}

pub(super) fn searchsploit() -> BuiltinTool {
    let descriptor = ToolDescriptor::new(
        "searchsploit",
        ToolCategory::Exploitation,
        "Search the Exploit-DB archive",
    )
    .with_parameter(ParameterSpec::required(
        "query",
        "Search terms (e.g. apache 2.4)",
    ))
    .with_parameter(
        ParameterSpec::optional("exact", "Exact title match")
            .with_type(ParamType::Flag)
            .with_default(false),
    )
    .with_timeout_secs(30);

    let binding = ToolBinding::new(|params: &ValidatedParams| -> Result<CommandLine, BuildError> {
        Ok(CommandLine::new("searchsploit")
            .arg_if(params.get_bool("exact").unwrap_or(false), "--exact")
            .arg(operand(params, "query")?))
    });

    BuiltinTool::new(descriptor, binding, "exploitdb")
}

pub(super) fn subfinder(paths: Arc<ToolPaths>) -> BuiltinTool {
    let descriptor = ToolDescriptor::new(
        "subfinder",
        ToolCategory::Dns,
        "Passive subdomain enumeration",
    )
    .with_parameter(ParameterSpec::required("domain", "Root domain"))
    .with_parameter(ParameterSpec::optional(
        "output",
        "File to write subdomains to (default: under the artifact directory)",
    ))
    .with_timeout_secs(600);

    let binding = ToolBinding::new(
        move |params: &ValidatedParams| -> Result<CommandLine, BuildError> {
            let domain = operand(params, "domain")?;
            let output = match optional_operand(params, "output")? {
                Some(path) => PathBuf::from(path),
                None => paths.subdomain_list(domain),
            };
            Ok(CommandLine::new("subfinder")
                .arg("-d")
                .arg(domain)
                .arg("-o")
                .arg(output.to_string_lossy())
                .arg("-silent")
                .with_artifact(output))
        },
    )
    .with_post_processor(SubdomainCount);

    BuiltinTool::new(descriptor, binding, "subfinder")
}

#[cfg(test)]
mod tests {
    use super::super::test_support::build;
    use super::*;
    use toolbench_domain::tool::Intent;

    #[test]
    fn test_echo_test_matches_end_to_end_shape() {
        let cmd = build(&echo_test(), Intent::new("echo_test").with_param("message", "hello"))
            .unwrap();
        assert_eq!(cmd.argv(), vec!["/bin/echo", "hello"]);
    }

    #[test]
    fn test_metacharacters_stay_in_one_slot() {
        let cmd = build(
            &echo_test(),
            Intent::new("echo_test").with_param("message", "hi; rm -rf / && $(id) `id` | cat"),
        )
        .unwrap();
        assert_eq!(cmd.args.len(), 1);
        assert_eq!(cmd.args[0], "hi; rm -rf / && $(id) `id` | cat");

        let cmd = build(
            &whois(),
            Intent::new("whois").with_param("target", "example.com; rm -rf /"),
        )
        .unwrap();
        assert_eq!(cmd.argv(), vec!["whois", "example.com; rm -rf /"]);
    }

    #[test]
    fn test_dig() {
        let cmd = build(&dig(), Intent::new("dig").with_param("domain", "example.com")).unwrap();
        assert_eq!(cmd.argv(), vec!["dig", "example.com", "A"]);

        let cmd = build(
            &dig(),
            Intent::new("dig")
                .with_param("domain", "example.com")
                .with_param("record_type", "MX")
                .with_param("dns_server", "8.8.8.8"),
        )
        .unwrap();
        assert_eq!(cmd.argv(), vec!["dig", "example.com", "MX", "@8.8.8.8"]);

        let cmd = build(
            &dig(),
            Intent::new("dig")
                .with_param("domain", "example.com")
                .with_param("dns_server", "@1.1.1.1"),
        )
        .unwrap();
        assert_eq!(cmd.args.last().map(String::as_str), Some("@1.1.1.1"));
    }

    #[test]
    fn test_dig_rejects_unknown_record_type() {
        let err = build(
            &dig(),
            Intent::new("dig")
                .with_param("domain", "example.com")
                .with_param("record_type", "BOGUS"),
        )
        .unwrap_err();
        assert!(err.contains("record_type"));
    }

    #[test]
    fn test_traceroute() {
        let cmd = build(
            &traceroute(),
            Intent::new("traceroute").with_param("target", "10.0.0.1"),
        )
        .unwrap();
        assert_eq!(cmd.argv(), vec!["traceroute", "-m", "30", "10.0.0.1"]);

        let err = build(
            &traceroute(),
            Intent::new("traceroute")
                .with_param("target", "10.0.0.1")
                .with_param("max_hops", "0"),
        )
        .unwrap_err();
        assert!(err.contains("max_hops"));
    }

    #[test]
    fn test_nmap_scan_types() {
        let base = || Intent::new("nmap").with_param("target", "192.168.1.0/24");

        let cmd = build(&nmap(), base()).unwrap();
        assert_eq!(cmd.argv(), vec!["nmap", "-p", "1-1000", "192.168.1.0/24"]);

        let cmd = build(&nmap(), base().with_param("scan_type", "quick")).unwrap();
        assert_eq!(cmd.argv(), vec!["nmap", "-F", "192.168.1.0/24"]);

        let cmd = build(
            &nmap(),
            base()
                .with_param("scan_type", "version")
                .with_param("ports", "22,80,443")
                .with_param("output_format", "verbose"),
        )
        .unwrap();
        assert_eq!(
            cmd.argv(),
            vec!["nmap", "-sV", "-p", "22,80,443", "-v", "192.168.1.0/24"]
        );

        let cmd = build(
            &nmap(),
            base()
                .with_param("scan_type", "udp")
                .with_param("ports", 53)
                .with_param("output_format", "xml"),
        )
        .unwrap();
        assert_eq!(
            cmd.argv(),
            vec!["nmap", "-sU", "-p", "53", "-oX", "-", "192.168.1.0/24"]
        );
    }

    #[test]
    fn test_nmap_rejects_bad_ports() {
        let base = || Intent::new("nmap").with_param("target", "10.0.0.1");
        for ports in ["0", "70000", "1-70000", "100-10", "http", "80,,443"] {
            let err = build(&nmap(), base().with_param("ports", ports)).unwrap_err();
            assert!(err.contains("ports"), "{ports}: {err}");
        }
        assert!(build(&nmap(), base().with_param("ports", "-")).is_ok());
        assert!(build(&nmap(), base().with_param("ports", "1-65535")).is_ok());
    }

    #[test]
    fn test_nmap_rejects_option_as_target() {
        let err = build(
            &nmap(),
            Intent::new("nmap").with_param("target", "--script=exploit"),
        )
        .unwrap_err();
        assert!(err.contains("target"));
    }

    #[test]
    fn test_masscan() {
        let cmd = build(
            &masscan(),
            Intent::new("masscan").with_param("target", "10.0.0.0/24"),
        )
        .unwrap();
        assert_eq!(
            cmd.argv(),
            vec!["masscan", "10.0.0.0/24", "-p1-1000", "--rate=100"]
        );

        let cmd = build(
            &masscan(),
            Intent::new("masscan")
                .with_param("target", "10.0.0.1")
                .with_param("ports", "-")
                .with_param("rate", "5000"),
        )
        .unwrap();
        assert_eq!(
            cmd.argv(),
            vec!["masscan", "10.0.0.1", "-p1-65535", "--rate=5000"]
        );

        let err = build(
            &masscan(),
            Intent::new("masscan")
                .with_param("target", "10.0.0.1")
                .with_param("ports", "80;id"),
        )
        .unwrap_err();
        assert!(err.contains("ports"));
    }

    #[test]
    fn test_netcat_port_check() {
        let cmd = build(
            &netcat(),
            Intent::new("netcat")
                .with_param("host", "10.0.0.5")
                .with_param("port", 22),
        )
        .unwrap();
        assert_eq!(cmd.argv(), vec!["nc", "-w", "5", "-vz", "10.0.0.5", "22"]);

        let cmd = build(
            &netcat(),
            Intent::new("netcat")
                .with_param("host", "10.0.0.5")
                .with_param("port", "53")
                .with_param("udp", true)
                .with_param("timeout", 2),
        )
        .unwrap();
        assert_eq!(
            cmd.argv(),
            vec!["nc", "-w", "2", "-vz", "-u", "10.0.0.5", "53"]
        );
    }

    #[test]
    fn test_netcat_limits() {
        let base = || Intent::new("netcat").with_param("host", "10.0.0.5");
        assert!(build(&netcat(), base().with_param("port", 0)).is_err());
        assert!(build(&netcat(), base().with_param("port", 70000)).is_err());
        let err = build(
            &netcat(),
            base().with_param("port", 80).with_param("timeout", 60),
        )
        .unwrap_err();
        assert!(err.contains("timeout"));
        assert!(build(&netcat(), base()).unwrap_err().contains("port"));
    }

    #[test]
    fn test_enum4linux_scan_types() {
        let base = || Intent::new("enum4linux").with_param("target", "10.0.0.7");
        assert_eq!(
            build(&enum4linux(), base()).unwrap().argv(),
            vec!["enum4linux", "-a", "10.0.0.7"]
        );
        assert_eq!(
            build(&enum4linux(), base().with_param("scan_type", "password_policy"))
                .unwrap()
                .argv(),
            vec!["enum4linux", "-P", "10.0.0.7"]
        );
        assert!(build(&enum4linux(), base().with_param("scan_type", "everything")).is_err());
    }

    #[test]
    fn test_searchsploit() {
        let cmd = build(
            &searchsploit(),
            Intent::new("searchsploit")
                .with_param("query", "apache 2.4")
                .with_param("exact", true),
        )
        .unwrap();
        assert_eq!(cmd.argv(), vec!["searchsploit", "--exact", "apache 2.4"]);
    }

    #[test]
    fn test_subfinder_derives_output() {
        let paths = Arc::new(ToolPaths::default().with_artifact_dir("/data"));
        let cmd = build(
            &subfinder(paths),
            Intent::new("subfinder").with_param("domain", "example.com"),
        )
        .unwrap();
        assert_eq!(
            cmd.argv(),
            vec![
                "subfinder",
                "-d",
                "example.com",
                "-o",
                "/data/subfinder_example.com.txt",
                "-silent"
            ]
        );
        assert_eq!(
            cmd.artifact(),
            Some(std::path::Path::new("/data/subfinder_example.com.txt"))
        );
    }
}
