use dnsrelay_application::ports::{DnsCachePort, HostTable, UpstreamTransport};
use dnsrelay_application::use_cases::HandleDnsQueryUseCase;
use dnsrelay_domain::Config;
use dnsrelay_infrastructure::dns::{
    CacheResponder, HostFile, InverseQuery, RecordCache, UdpTransport,
};
use std::sync::Arc;
use tracing::{info, warn};

pub struct DnsServices {
    pub cache: Arc<RecordCache>,
    pub handler_use_case: Arc<HandleDnsQueryUseCase>,
}

impl DnsServices {
    pub fn new(config: &Config) -> Self {
        info!("Initializing DNS services");

        let hosts = Arc::new(Self::load_hosts(config));
        let cache = Arc::new(RecordCache::new());
        let responder = CacheResponder::new(InverseQuery::new(
            Arc::clone(&cache),
            config.dns.max_cname_hops,
        ));
        let upstreams = Self::build_upstreams(config);

        let handler_use_case = Arc::new(HandleDnsQueryUseCase::new(
            Arc::clone(&hosts) as Arc<dyn HostTable>,
            Arc::new(responder) as Arc<dyn DnsCachePort>,
            upstreams,
            config.dns.query_timeout(),
        ));

        info!(
            upstreams = handler_use_case.upstream_count(),
            host_entries = hosts.len(),
            max_cname_hops = config.dns.max_cname_hops,
            timeout_ms = config.dns.query_timeout_ms,
            "DNS services ready"
        );

        Self {
            cache,
            handler_use_case,
        }
    }

    fn load_hosts(config: &Config) -> HostFile {
        match &config.dns.hosts_file {
            Some(path) => HostFile::load(path),
            None => {
                info!("No host file configured");
                HostFile::new()
            }
        }
    }

    fn build_upstreams(config: &Config) -> Vec<Arc<dyn UpstreamTransport>> {
        let upstreams: Vec<Arc<dyn UpstreamTransport>> = config
            .dns
            .upstream_addrs()
            .into_iter()
            .map(|addr| {
                info!(server = %addr, "Upstream configured");
                Arc::new(UdpTransport::new(addr)) as Arc<dyn UpstreamTransport>
            })
            .collect();

        if upstreams.is_empty() {
            warn!("No usable upstream servers, only local answers will be served");
        }
        upstreams
    }
}
