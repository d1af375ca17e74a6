// Legacy LuCI endpoints
//
// The access point firmware only applies staged wireless changes through
// two form-encoded CGI endpoints outside the ubus envelope. They take the
// ubus session id under different field names (`sid`, `sessionid`) and
// are kept separate from the general call path on purpose.

use tracing::debug;

use crate::client::UbusClient;
use crate::error::Error;
use crate::transport::Transport;

pub const APPLY_UNCHECKED_PATH: &str = "/cgi-bin/luci/admin/uci/apply_unchecked";
pub const CGI_EXEC_PATH: &str = "/cgi-bin/cgi-exec";

/// Command run through `cgi-exec` after the SSIDs are applied.
pub const WIFI_RELOAD_COMMAND: &str = "/sbin/wifi reload";

impl<T: Transport> UbusClient<T> {
    /// Apply the session's staged UCI changes without LuCI's rollback timer.
    pub async fn apply_unchecked(&self) -> Result<(), Error> {
        let sid = self.session()?;
        debug!("applying staged uci changes");
        self.post_form(APPLY_UNCHECKED_PATH, &[("sid", sid)]).await?;
        Ok(())
    }

    /// `wifi reload` via `cgi-exec`. The endpoint only ever receives this
    /// one command.
    pub async fn reload_wifi(&self) -> Result<(), Error> {
        let sid = self.session()?;
        debug!(command = WIFI_RELOAD_COMMAND, "cgi-exec");
        self.post_form(
            CGI_EXEC_PATH,
            &[("sessionid", sid), ("command", WIFI_RELOAD_COMMAND)],
        )
        .await?;
        Ok(())
    }
}
