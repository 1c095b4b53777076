//! Embedded control page.
//!
//! Served from flash as a single compiled-in string. The page polls
//! `/api/state` once a second and drives the relays through the `/`
//! control query, so it needs no assets beyond this document.

pub const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>KC868-A16 Relay Control</title>
<style>
  body { font-family: sans-serif; margin: 0; padding: 16px; background: #f4f4f4; }
  h1 { font-size: 1.4rem; }
  .grid { display: flex; flex-wrap: wrap; gap: 8px; margin-bottom: 16px; }
  .relay { width: 120px; padding: 10px 0; border: none; border-radius: 6px;
           font-size: 1rem; cursor: pointer; color: #fff; }
  .relay.on { background: #28a745; }
  .relay.off { background: #6c757d; }
  .all { padding: 10px 24px; border: none; border-radius: 6px; font-size: 1rem;
         cursor: pointer; background: #007bff; color: #fff; margin-bottom: 16px; }
  .input { display: inline-block; width: 100px; padding: 6px 0; margin: 4px;
           border-radius: 6px; text-align: center; }
  .input.on { background: #d4edda; color: #155724; }
  .input.off { background: #f8d7da; color: #721c24; }
  .stale { opacity: 0.5; }
</style>
</head>
<body>
<h1>KC868-A16 Relay Control</h1>
<button class="all" id="all-btn">Toggle All</button>
<div class="grid" id="relays"></div>
<h1>Inputs</h1>
<div id="inputs"></div>
<script>
const send = async (relay, state) => {
  try {
    const r = await fetch(`/?relay=${relay}&state=${state}`);
    if (r.ok) render(await r.json());
  } catch (e) { console.error('control failed', e); }
};

const render = (data) => {
  const relays = document.getElementById('relays');
  relays.innerHTML = '';
  data.relays.forEach((on, i) => {
    const id = i + 1;
    const b = document.createElement('button');
    b.className = 'relay ' + (on ? 'on' : 'off');
    b.textContent = `Relay ${id} - ${on ? 'ON' : 'OFF'}`;
    b.onclick = () => send(id, on ? 'off' : 'on');
    relays.appendChild(b);
  });

  const inputs = document.getElementById('inputs');
  inputs.innerHTML = '';
  data.inputs.forEach((on, i) => {
    const p = document.createElement('span');
    p.className = 'input ' + (on ? 'on' : 'off');
    p.textContent = `Input ${i + 1}: ${on ? 'ON' : 'OFF'}`;
    inputs.appendChild(p);
  });
  document.body.classList.remove('stale');
};

document.getElementById('all-btn').onclick = () => send('all', 'toggle');

const poll = async () => {
  try {
    const r = await fetch('/api/state');
    if (r.ok) render(await r.json());
  } catch (e) {
    document.body.classList.add('stale');
  }
};

poll();
setInterval(poll, 1000);
</script>
</body>
</html>
"#;
