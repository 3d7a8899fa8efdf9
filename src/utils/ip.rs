//! 客户端地址识别
//!
//! 访客签名取连接的对端 IP；只有对端属于 `server.trusted_proxies`
//! （单个 IP 或 CIDR）时才采用 X-Forwarded-For / X-Real-IP。

use std::net::IpAddr;

use actix_web::HttpRequest;
use actix_web::http::header::HeaderMap;
use tracing::debug;

use crate::config::get_config;

/// 无法确定来源地址时使用的签名
pub const UNKNOWN_SIGNATURE: &str = "unknown";

/// 检查 IP 是否在可信代理列表中
pub fn is_trusted_proxy(ip: &IpAddr, trusted_proxies: &[String]) -> bool {
    trusted_proxies.iter().any(|proxy| {
        let proxy = proxy.trim();
        if proxy.contains('/') {
            ip_in_cidr(ip, proxy)
        } else {
            proxy.parse::<IpAddr>().is_ok_and(|addr| addr == *ip)
        }
    })
}

/// CIDR 检查
pub fn ip_in_cidr(ip: &IpAddr, cidr: &str) -> bool {
    let Some((network, prefix_len)) = cidr.split_once('/') else {
        return false;
    };
    let Ok(prefix_len) = prefix_len.parse::<u32>() else {
        return false;
    };
    let Ok(network_addr) = network.parse::<IpAddr>() else {
        return false;
    };

    match (ip, network_addr) {
        (IpAddr::V4(ip), IpAddr::V4(net)) if prefix_len <= 32 => {
            let mask = u32::MAX.checked_shl(32 - prefix_len).unwrap_or(0);
            (u32::from(*ip) & mask) == (u32::from(net) & mask)
        }
        (IpAddr::V6(ip), IpAddr::V6(net)) if prefix_len <= 128 => {
            let mask = u128::MAX.checked_shl(128 - prefix_len).unwrap_or(0);
            (u128::from(*ip) & mask) == (u128::from(net) & mask)
        }
        _ => false,
    }
}

/// 从请求头提取转发的客户端 IP（X-Forwarded-For 第一项，其次 X-Real-IP）
///
/// 只接受能解析为 IP 的值，其余一律忽略。
pub fn forwarded_ip_from_headers(headers: &HeaderMap) -> Option<IpAddr> {
    let header_ip = |name: &str, first_only: bool| {
        headers
            .get(name)
            .and_then(|h| h.to_str().ok())
            .map(|s| {
                if first_only {
                    s.split(',').next().unwrap_or_default()
                } else {
                    s
                }
            })
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
    };

    header_ip("x-forwarded-for", true).or_else(|| header_ip("x-real-ip", false))
}

/// 根据对端地址、请求头和可信代理列表计算访客签名
pub fn resolve_signature(
    peer: Option<IpAddr>,
    headers: &HeaderMap,
    trusted_proxies: &[String],
) -> String {
    let Some(peer) = peer else {
        return UNKNOWN_SIGNATURE.to_string();
    };

    if is_trusted_proxy(&peer, trusted_proxies)
        && let Some(real_ip) = forwarded_ip_from_headers(headers)
    {
        debug!("Trusted proxy {} -> {}", peer, real_ip);
        return real_ip.to_string();
    }

    peer.to_string()
}

/// 从 HttpRequest 计算访客签名
pub fn client_signature(req: &HttpRequest) -> String {
    let config = get_config();
    resolve_signature(
        req.peer_addr().map(|addr| addr.ip()),
        req.headers(),
        &config.server.trusted_proxies,
    )
}
